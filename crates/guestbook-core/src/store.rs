//! # Archival Store
//!
//! The active log is a single JSON array, newest first, capped at N entries
//! (see [`StorageConfig::max_active_entries()`]). Every append rewrites the
//! whole file; entries pushed past the cap are handed to the
//! [`ArchiveChain`].
//!
//! Reads are never cached: [`ArchivalStore::list()`] goes to disk on every
//! call. A missing or unparsable active log reads as empty and is logged.
//!
//! Mutations take an advisory lock on `.guestbook.lock` for the whole
//! read-modify-write cycle. Within one process, [`crate::writer::StoreHandle`]
//! additionally funnels all appends through a single writer.

use crate::archive::{ArchiveChain, ArchiveReport, ChunkFile};
use crate::config::StorageConfig;
use crate::entry::{Entry, NewEntry};
use crate::error::{GuestbookError, Result};
use crate::safe_io::{FileLock, atomic_write_json, read_json_file};
use chrono::{DateTime, Local, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Path computation for the store's data directory. Pure, no I/O.
pub trait StorePaths {
    fn data_dir(&self) -> &Path;

    /// The active log (`guestbook.json`).
    fn active_log_file(&self) -> PathBuf {
        self.data_dir().join("guestbook.json")
    }

    /// Directory holding archive chunks.
    fn archive_dir(&self) -> PathBuf {
        self.data_dir().join("archive")
    }

    /// Advisory lock taken by every writer.
    fn lock_file(&self) -> PathBuf {
        self.data_dir().join(".guestbook.lock")
    }
}

/// Summary of one archive chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSummary {
    pub name: String,
    pub entries: usize,
}

pub struct ArchivalStore {
    data_dir: PathBuf,
    config: StorageConfig,
    archive: ArchiveChain,
}

impl StorePaths for ArchivalStore {
    fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl ArchivalStore {
    /// Opens the store, creating the data directory and an empty active log
    /// if they don't exist yet.
    pub fn open(data_dir: impl Into<PathBuf>, config: StorageConfig) -> Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(GuestbookError::write(&data_dir))?;

        let store = Self {
            archive: ArchiveChain::new(data_dir.join("archive")),
            data_dir,
            config,
        };

        let active = store.active_log_file();
        if !active.exists() {
            atomic_write_json(&active, &Vec::<Entry>::new())
                .map_err(GuestbookError::write(&active))?;
            info!(path = %active.display(), "created empty guestbook");
        }

        Ok(store)
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Returns the active log, newest first, read fresh from disk.
    pub fn list(&self) -> Vec<Entry> {
        self.read_active()
    }

    /// Validates and appends a submission stamped with the current time.
    pub fn append(&self, name: Option<&str>, answer: &str) -> Result<Entry> {
        let entry = NewEntry::parse(name, Some(answer), self.config.anonymous_name())?;
        self.append_entry(entry, Local::now())
    }

    /// Inserts a validated submission at the front of the active log, then
    /// trims and archives.
    pub fn append_entry(&self, entry: NewEntry, now: DateTime<Local>) -> Result<Entry> {
        let _lock = self.lock()?;

        let mut log = self.read_active();
        let entry = entry.into_entry(now, log.first());
        log.insert(0, entry.clone());

        let report = self.persist(log, now.with_timezone(&Utc))?;
        info!(
            id = %entry.id,
            archived = report.archived,
            "guestbook entry appended"
        );
        Ok(entry)
    }

    /// Trims the active log to the configured cap without appending.
    ///
    /// Run at startup so a lowered cap takes effect before the next write.
    pub fn enforce_cap(&self) -> Result<ArchiveReport> {
        let _lock = self.lock()?;

        let log = self.read_active();
        if log.len() <= self.config.max_active_entries() {
            return Ok(ArchiveReport::default());
        }

        let report = self.persist(log, Utc::now())?;
        info!(
            archived = report.archived,
            chunks_created = report.created.len(),
            "active log trimmed to cap"
        );
        Ok(report)
    }

    /// Full history, newest first: the active log followed by every archive
    /// chunk from newest to oldest.
    ///
    /// Unlike [`list()`](Self::list), read failures are reported, not masked.
    pub fn history(&self) -> Result<Vec<Entry>> {
        let active = self.active_log_file();
        let mut entries: Vec<Entry> = read_json_file(&active)
            .map_err(GuestbookError::read(&active))?
            .unwrap_or_default();

        for chunk in self.chunk_files()?.iter().rev() {
            let chunk_entries = self
                .archive
                .read_chunk(chunk)
                .map_err(GuestbookError::read(&chunk.path))?;
            entries.extend(chunk_entries.into_iter().rev());
        }

        Ok(entries)
    }

    /// Archive chunks in creation order with their entry counts.
    pub fn archive_chunks(&self) -> Result<Vec<ChunkSummary>> {
        self.chunk_files()?
            .into_iter()
            .map(|chunk| {
                let entries = self
                    .archive
                    .read_chunk(&chunk)
                    .map_err(GuestbookError::read(&chunk.path))?;
                Ok(ChunkSummary {
                    name: chunk.name,
                    entries: entries.len(),
                })
            })
            .collect()
    }

    fn chunk_files(&self) -> Result<Vec<ChunkFile>> {
        self.archive
            .chunk_files()
            .map_err(GuestbookError::read(self.archive.dir()))
    }

    fn lock(&self) -> Result<FileLock> {
        let path = self.lock_file();
        FileLock::acquire(&path).map_err(GuestbookError::write(&path))
    }

    fn read_active(&self) -> Vec<Entry> {
        let path = self.active_log_file();
        match read_json_file(&path) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                warn!(
                    error = %GuestbookError::read(&path)(e),
                    "treating unreadable active log as empty"
                );
                Vec::new()
            }
        }
    }

    /// Splits off everything past the cap, archives it, then writes the kept
    /// prefix as the new active log.
    ///
    /// The archive is written first: a failure between the two writes can
    /// duplicate entries across active log and archive but never loses one.
    fn persist(&self, mut log: Vec<Entry>, now: DateTime<Utc>) -> Result<ArchiveReport> {
        let cap = self.config.max_active_entries();
        let overflow = if log.len() > cap {
            log.split_off(cap)
        } else {
            Vec::new()
        };

        let report = self.archive.absorb(overflow, cap, now)?;

        let active = self.active_log_file();
        atomic_write_json(&active, &log).map_err(GuestbookError::write(&active))?;
        Ok(report)
    }
}
