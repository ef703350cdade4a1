//! Error types for btlescan-store.

use std::path::PathBuf;

/// Result type for btlescan-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in btlescan-store.
///
/// These are infrastructure failures: callers cannot make progress without
/// the store, so they are propagated rather than handled locally.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A stored value could not be interpreted as expected.
    #[error("Invalid stored value for key '{key}': {value:?}")]
    InvalidValue { key: String, value: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
