//! Safe file I/O utilities: atomic writes, tolerant JSON reads and file locking.
//!
//! - [`atomic_write_json()`] - Write JSON atomically (temp file + rename)
//! - [`read_json_file()`] - Read a JSON document, distinguishing "missing" from "broken"
//! - [`FileLock`] - RAII advisory lock using fs2
//!
//! The active log and archive chunks are whole-file documents, so every write
//! replaces the file. Writing to a sibling temp file and renaming means a
//! crash leaves either the old document or the new one on disk.

use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

/// Atomically write pretty-printed JSON to a file.
///
/// # Errors
///
/// Returns an error if serialization fails, the temporary file cannot be
/// written, or the rename fails.
pub fn atomic_write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> io::Result<()> {
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    atomic_write(path, &json)
}

/// Atomically write bytes to a file.
///
/// Writes to a temporary file (`.tmp` extension) with fsync, then renames it
/// over the target path. Parent directories are created as needed.
pub fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("tmp");

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)?;

    {
        let mut writer = BufWriter::new(&mut file);
        writer.write_all(contents)?;
        writer.flush()?;
    }

    // Sync to disk before rename
    file.sync_all()?;

    fs::rename(&tmp_path, path)?;

    Ok(())
}

/// Read and deserialize a JSON document.
///
/// Returns `Ok(None)` when the file does not exist. A file that exists but
/// cannot be parsed yields an `InvalidData` error carrying the parse message.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> io::Result<Option<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    serde_json::from_reader(BufReader::new(file))
        .map(Some)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// RAII file lock using fs2 exclusive locking.
///
/// The lock is acquired when created and released when dropped. Locking is
/// advisory: every writer of the data directory takes the same lock file.
pub struct FileLock {
    file: File,
}

impl FileLock {
    /// Acquire an exclusive lock on the given path, blocking until available.
    ///
    /// Creates the lock file (and its parent directories) if it doesn't exist.
    pub fn acquire(lock_path: &Path) -> io::Result<Self> {
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path)?;

        file.lock_exclusive()?;

        Ok(Self { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
