//! Common error types for songdeck

use thiserror::Error;

/// Common result type for songdeck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across songdeck crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Song library document missing or malformed (fatal for a run)
    #[error("Library load error: {0}")]
    LibraryLoad(String),

    /// Persisted cache document could not be parsed
    #[error("Cache corrupt: {0}")]
    CacheCorrupt(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operator ended input (EOF or interrupt) while a decision was pending
    #[error("Aborted by operator: {0}")]
    Aborted(String),
}
