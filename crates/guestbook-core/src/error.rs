//! Error types for guestbook storage and validation.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Common result type for guestbook operations.
pub type Result<T> = std::result::Result<T, GuestbookError>;

/// Message shown to a visitor who submits an empty answer.
pub const EMPTY_ANSWER_MESSAGE: &str = "답변을 입력해주세요.";

#[derive(Debug, Error)]
pub enum GuestbookError {
    /// The submitted entry was rejected; the message is meant for the visitor.
    #[error("{0}")]
    Validation(String),

    #[error("failed to read {}: {source}", path.display())]
    StorageRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The single writer task has stopped and can no longer accept appends.
    #[error("store writer is no longer running")]
    WriterClosed,
}

impl GuestbookError {
    pub fn empty_answer() -> Self {
        Self::Validation(EMPTY_ANSWER_MESSAGE.to_string())
    }

    pub(crate) fn write(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::StorageWrite { path, source }
    }

    pub(crate) fn read(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::StorageRead { path, source }
    }

    /// True for errors caused by visitor input rather than the server.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
