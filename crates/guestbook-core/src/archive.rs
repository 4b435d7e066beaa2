//! # Archive Chunks
//!
//! Entries trimmed off the active log are moved into fixed-size archive
//! chunk files:
//!
//! ```text
//! data/
//! ├── guestbook.json                              # Active log, newest first
//! └── archive/
//!     ├── archive-20261016T101500.123Z.json       # Full chunk (N entries)
//!     └── archive-20261017T080102.004Z.json       # Newest chunk, may be partial
//! ```
//!
//! Chunk names embed a fixed-width UTC timestamp, so lexicographic order is
//! creation order. Entries inside a chunk are stored oldest first.
//!
//! Only the newest chunk is ever rewritten, and only while it holds fewer
//! than N entries. Every other chunk holds exactly N entries.

use crate::entry::Entry;
use crate::error::{GuestbookError, Result};
use crate::safe_io::{atomic_write_json, read_json_file};
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CHUNK_PREFIX: &str = "archive-";
const CHUNK_EXTENSION: &str = "json";
const CHUNK_TIME_FORMAT: &str = "%Y%m%dT%H%M%S%.3fZ";

/// An archive chunk file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFile {
    /// File name, e.g. `archive-20261016T101500.123Z.json`.
    pub name: String,
    pub path: PathBuf,
}

impl ChunkFile {
    /// Creation time embedded in the file name.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        chunk_created_at(&self.name)
    }
}

/// What a call to [`ArchiveChain::absorb()`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Number of entries moved into the archive.
    pub archived: usize,
    /// Newest existing chunk that was filled further in place, if any.
    pub updated: Option<String>,
    /// Chunk files created, oldest first.
    pub created: Vec<String>,
}

impl ArchiveReport {
    pub fn is_empty(&self) -> bool {
        self.archived == 0
    }
}

/// The ordered set of archive chunks in one directory.
#[derive(Debug, Clone)]
pub struct ArchiveChain {
    dir: PathBuf,
}

impl ArchiveChain {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lists chunk files in creation order. A missing directory has no chunks.
    pub fn chunk_files(&self) -> io::Result<Vec<ChunkFile>> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut chunks = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry?;
            let Ok(name) = dir_entry.file_name().into_string() else {
                continue;
            };
            if is_chunk_name(&name) {
                chunks.push(ChunkFile {
                    path: dir_entry.path(),
                    name,
                });
            }
        }
        chunks.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(chunks)
    }

    /// The lexicographically last (newest) chunk, if any.
    pub fn latest(&self) -> io::Result<Option<ChunkFile>> {
        Ok(self.chunk_files()?.pop())
    }

    /// Reads a chunk's entries, oldest first. A missing file reads as empty.
    pub fn read_chunk(&self, chunk: &ChunkFile) -> io::Result<Vec<Entry>> {
        Ok(read_json_file(&chunk.path)?.unwrap_or_default())
    }

    /// Moves `overflow` into the archive.
    ///
    /// `overflow` is the tail of the active log and therefore newest first;
    /// it is reversed so chunks stay in chronological order. The newest chunk
    /// is filled up to `chunk_size` in place, then new chunks are started
    /// until the buffer is exhausted. Any number of overflow entries is
    /// handled in one call.
    pub fn absorb(
        &self,
        overflow: Vec<Entry>,
        chunk_size: usize,
        now: DateTime<Utc>,
    ) -> Result<ArchiveReport> {
        let mut report = ArchiveReport::default();
        if overflow.is_empty() {
            return Ok(report);
        }
        let chunk_size = chunk_size.max(1);

        let latest = self.latest().unwrap_or_else(|e| {
            warn!(dir = %self.dir.display(), error = %e, "cannot list archive chunks; starting a new chunk");
            None
        });
        let mut last_name = latest.as_ref().map(|chunk| chunk.name.clone());

        let (mut target, mut buffer) = match latest {
            Some(chunk) => match self.read_chunk(&chunk) {
                Ok(entries) if entries.len() < chunk_size => (Some(chunk), entries),
                Ok(_) => (None, Vec::new()),
                Err(e) => {
                    warn!(
                        chunk = %chunk.name,
                        error = %GuestbookError::read(&chunk.path)(e),
                        "unreadable archive chunk left untouched; starting a new chunk"
                    );
                    (None, Vec::new())
                }
            },
            None => (None, Vec::new()),
        };

        report.archived = overflow.len();
        buffer.extend(overflow.into_iter().rev());

        while !buffer.is_empty() {
            let take = buffer.len().min(chunk_size);
            let batch: Vec<Entry> = buffer.drain(..take).collect();

            let chunk = match target.take() {
                Some(chunk) => {
                    report.updated = Some(chunk.name.clone());
                    chunk
                }
                None => {
                    let name = next_chunk_name(last_name.as_deref(), now);
                    last_name = Some(name.clone());
                    report.created.push(name.clone());
                    ChunkFile {
                        path: self.dir.join(&name),
                        name,
                    }
                }
            };

            atomic_write_json(&chunk.path, &batch).map_err(GuestbookError::write(&chunk.path))?;
            debug!(chunk = %chunk.name, entries = batch.len(), "wrote archive chunk");
        }

        Ok(report)
    }
}

/// Chunk names must carry a parseable timestamp. Other `archive-*.json`
/// files (backups, hand-made copies) are not part of the chain.
fn is_chunk_name(name: &str) -> bool {
    chunk_created_at(name).is_some()
}

fn chunk_created_at(name: &str) -> Option<DateTime<Utc>> {
    let stamp = name
        .strip_prefix(CHUNK_PREFIX)?
        .strip_suffix(CHUNK_EXTENSION)?
        .strip_suffix('.')?;
    let created = NaiveDateTime::parse_from_str(stamp, CHUNK_TIME_FORMAT)
        .ok()?
        .and_utc();
    // Parsing accepts any fraction width; only the canonical spelling sorts right.
    (chunk_name(created) == name).then_some(created)
}

fn chunk_name(time: DateTime<Utc>) -> String {
    format!(
        "{CHUNK_PREFIX}{}.{CHUNK_EXTENSION}",
        time.format(CHUNK_TIME_FORMAT)
    )
}

/// Name for a new chunk, strictly after `latest` in lexicographic order.
///
/// A `latest` without a parseable timestamp is ignored. Since both names then
/// share the fixed-width format, one step past the floor always suffices.
fn next_chunk_name(latest: Option<&str>, now: DateTime<Utc>) -> String {
    let floor = latest
        .and_then(chunk_created_at)
        .map(|created| created + TimeDelta::milliseconds(1));

    match floor {
        Some(floor) if floor > now => chunk_name(floor),
        _ => chunk_name(now),
    }
}
