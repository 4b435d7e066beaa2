//! Storage configuration for the archival store.
//!
//! All fields are optional so a config file can override any subset; the
//! effective getters apply defaults and lower bounds.

use serde::{Deserialize, Serialize};

/// Default maximum number of entries kept in the active log.
pub const DEFAULT_MAX_ACTIVE_ENTRIES: usize = 2000;

/// Default display name for visitors who leave the name blank.
pub const DEFAULT_ANONYMOUS_NAME: &str = "익명";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct StorageConfig {
    /// Maximum entries in the active log (N). Also the size of every full
    /// archive chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_active_entries: Option<usize>,

    /// Name stored for entries submitted without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous_name: Option<String>,
}

impl StorageConfig {
    /// Returns the effective cap. Never zero, so trimming always terminates.
    #[inline]
    pub fn max_active_entries(&self) -> usize {
        self.max_active_entries
            .unwrap_or(DEFAULT_MAX_ACTIVE_ENTRIES)
            .max(1)
    }

    /// Returns the effective anonymous placeholder; blank values fall back to the default.
    pub fn anonymous_name(&self) -> &str {
        match self.anonymous_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_ANONYMOUS_NAME,
        }
    }

    /// Merge with another config, where `other` takes precedence.
    pub fn merge(&self, other: &StorageConfig) -> StorageConfig {
        StorageConfig {
            max_active_entries: other.max_active_entries.or(self.max_active_entries),
            anonymous_name: other
                .anonymous_name
                .clone()
                .or_else(|| self.anonymous_name.clone()),
        }
    }
}
