//! Single-writer queue in front of the [`ArchivalStore`].
//!
//! Every append is sent to one dedicated thread that owns all mutations, so
//! concurrent submissions are applied one after another instead of racing
//! through read-modify-write. Reads bypass the queue and hit the file on the
//! blocking pool.

use crate::entry::{Entry, NewEntry};
use crate::error::{GuestbookError, Result};
use crate::store::ArchivalStore;
use chrono::Local;
use std::io;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Appends that may wait for the writer before senders are back-pressured.
const WRITE_QUEUE_DEPTH: usize = 64;

enum WriteCommand {
    Append {
        entry: NewEntry,
        reply: oneshot::Sender<Result<Entry>>,
    },
}

/// Cloneable handle to a store guarded by a single writer thread.
///
/// The writer thread exits once every handle has been dropped.
#[derive(Clone)]
pub struct StoreHandle {
    store: Arc<ArchivalStore>,
    commands: mpsc::Sender<WriteCommand>,
}

impl StoreHandle {
    /// Starts the writer thread.
    pub fn spawn(store: ArchivalStore) -> io::Result<Self> {
        let store = Arc::new(store);
        let (commands, mut queue) = mpsc::channel::<WriteCommand>(WRITE_QUEUE_DEPTH);

        let writer = Arc::clone(&store);
        std::thread::Builder::new()
            .name("guestbook-writer".to_string())
            .spawn(move || {
                while let Some(command) = queue.blocking_recv() {
                    match command {
                        WriteCommand::Append { entry, reply } => {
                            let result = writer.append_entry(entry, Local::now());
                            if let Err(e) = &result {
                                warn!(error = %e, "append failed");
                            }
                            // The requester may have gone away; the entry is stored regardless.
                            let _ = reply.send(result);
                        }
                    }
                }
                debug!("store writer stopped");
            })?;

        Ok(Self { store, commands })
    }

    pub fn store(&self) -> &ArchivalStore {
        &self.store
    }

    /// Validates a submission, then queues it for the writer and waits for
    /// the stored entry.
    ///
    /// Validation failures are returned without touching the queue.
    pub async fn append(&self, name: Option<&str>, answer: Option<&str>) -> Result<Entry> {
        let entry = NewEntry::parse(name, answer, self.store.config().anonymous_name())?;

        let (reply, response) = oneshot::channel();
        self.commands
            .send(WriteCommand::Append { entry, reply })
            .await
            .map_err(|_| GuestbookError::WriterClosed)?;

        response.await.map_err(|_| GuestbookError::WriterClosed)?
    }

    /// Reads the active log fresh from disk.
    pub async fn list(&self) -> Vec<Entry> {
        let store = Arc::clone(&self.store);
        match tokio::task::spawn_blocking(move || store.list()).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "active log read task failed");
                Vec::new()
            }
        }
    }
}
