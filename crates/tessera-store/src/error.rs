//! Error types for the store module.

use tessera_core::RepresentationError;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted record failed to decode.
    #[error("invalid record {line} in chain {address}: {source}")]
    Representation {
        address: String,
        line: usize,
        #[source]
        source: RepresentationError,
    },

    /// A record already exists at the appended index.
    #[error("conflict in chain {address}: index {index} appended, next free index is {expected}")]
    Conflict {
        address: String,
        index: u64,
        expected: u64,
    },

    /// A lock guarding backend state was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// A blocking storage task failed to complete.
    #[error("storage task failed: {0}")]
    Task(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
