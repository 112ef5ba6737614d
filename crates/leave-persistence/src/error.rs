//! Error types for persistence operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during persistence operations.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Failed to read from file system.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write to file system.
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize or deserialize JSON.
    #[error("failed to serialize: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Failed to create directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Item not found.
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// A uniqueness constraint rejected the write.
    #[error("{kind} already exists: {id}")]
    Conflict { kind: String, id: String },

    /// The remote backend could not be reached.
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote backend answered with an error.
    #[error("backend error {status}: {message}")]
    Backend { status: u16, message: String },
}

impl PersistenceError {
    /// Shorthand for a [`PersistenceError::NotFound`].
    pub fn not_found(kind: &str, id: impl ToString) -> Self {
        Self::NotFound {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }

    /// Shorthand for a [`PersistenceError::Conflict`].
    pub fn conflict(kind: &str, id: impl ToString) -> Self {
        Self::Conflict {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
