//! Server configuration loaded from `guestbook.toml`.
//!
//! ```toml
//! listen = "0.0.0.0:3000"
//! data_dir = "./data"
//! static_dir = "./public"
//! log_level = "info"
//!
//! [storage]
//! max_active_entries = 2000
//! anonymous_name = "익명"
//! ```
//!
//! Every field is optional. Command-line flags and environment variables
//! override the file via [`ServerConfig::merge`].

use guestbook_core::StorageConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

pub const DEFAULT_LISTEN: &str = "0.0.0.0:3000";
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Directory served for every path the API does not handle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    pub storage: StorageConfig,
}

impl ServerConfig {
    /// Reads a config file. A missing file yields the defaults; a file that
    /// exists but does not parse is an error.
    pub fn load(path: &Path) -> io::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e),
        };
        toml::from_str(&content).map_err(|e| {
            io::Error::new(
                ErrorKind::InvalidData,
                format!("Failed to parse {}: {}", path.display(), e),
            )
        })
    }

    /// Merge with another config, where `other` takes precedence.
    pub fn merge(&self, other: &ServerConfig) -> ServerConfig {
        ServerConfig {
            listen: other.listen.clone().or_else(|| self.listen.clone()),
            data_dir: other.data_dir.clone().or_else(|| self.data_dir.clone()),
            static_dir: other.static_dir.clone().or_else(|| self.static_dir.clone()),
            log_level: other.log_level.clone().or_else(|| self.log_level.clone()),
            storage: self.storage.merge(&other.storage),
        }
    }

    pub fn listen(&self) -> &str {
        self.listen.as_deref().unwrap_or(DEFAULT_LISTEN)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}
