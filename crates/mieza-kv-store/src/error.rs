//! Storage error types.

use thiserror::Error;

/// Storage error type.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Backend-specific failure (quota, read-only store, ...)
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type alias using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;
