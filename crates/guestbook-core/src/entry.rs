//! Guestbook entries and submission validation.

use crate::error::{GuestbookError, Result};
use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// A persisted guestbook entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Creation time in Unix milliseconds, as a decimal string.
    pub id: String,
    pub name: String,
    pub answer: String,
    #[serde(alias = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Localized creation time for display (`2024. 1. 5. 오후 3:04:05`).
    #[serde(alias = "date")]
    pub display_date: String,
}

impl Entry {
    /// Numeric form of the id, if it is one.
    pub fn id_millis(&self) -> Option<i64> {
        self.id.parse().ok()
    }

    /// Answer length in characters, used to pick a bubble width class.
    pub fn answer_chars(&self) -> usize {
        self.answer.chars().count()
    }
}

/// A validated submission, not yet assigned an id or timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    name: String,
    answer: String,
}

impl NewEntry {
    /// Validates and normalizes a submission.
    ///
    /// The answer must be non-empty after trimming. The name is trimmed and
    /// falls back to `anonymous_name` when absent or blank.
    pub fn parse(name: Option<&str>, answer: Option<&str>, anonymous_name: &str) -> Result<Self> {
        let answer = answer.map(str::trim).unwrap_or_default();
        if answer.is_empty() {
            return Err(GuestbookError::empty_answer());
        }

        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => anonymous_name,
        };

        Ok(Self {
            name: name.to_string(),
            answer: answer.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Stamps the submission with an id and both timestamp forms.
    ///
    /// `previous` is the newest stored entry; the id is bumped past it so ids
    /// stay unique even for two submissions within the same millisecond.
    pub fn into_entry(self, now: DateTime<Local>, previous: Option<&Entry>) -> Entry {
        let created_at = now.with_timezone(&Utc);
        let id = next_id(created_at.timestamp_millis(), previous);
        Entry {
            id: id.to_string(),
            name: self.name,
            answer: self.answer,
            created_at,
            display_date: korean_display_date(&now),
        }
    }
}

/// Returns `max(now_ms, previous_id + 1)`.
fn next_id(now_ms: i64, previous: Option<&Entry>) -> i64 {
    match previous.and_then(Entry::id_millis) {
        Some(last) if last >= now_ms => last + 1,
        _ => now_ms,
    }
}

/// Formats a time the way the `ko-KR` locale prints `toLocaleString`.
pub fn korean_display_date<Tz: TimeZone>(time: &DateTime<Tz>) -> String {
    let (is_pm, hour) = time.hour12();
    format!(
        "{}. {}. {}. {} {}:{:02}:{:02}",
        time.year(),
        time.month(),
        time.day(),
        if is_pm { "오후" } else { "오전" },
        hour,
        time.minute(),
        time.second()
    )
}
