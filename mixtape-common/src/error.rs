//! Common error types for mixtape

use thiserror::Error;

/// Common result type for mixtape operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the library core and the HTTP layer
///
/// The first five variants are domain faults surfaced to the user; the rest
/// are infrastructure faults.
#[derive(Error, Debug)]
pub enum Error {
    /// Empty or missing required field; the operation is aborted with no
    /// partial mutation
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Operation target id absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate upload or duplicate song-in-playlist
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Audio metadata could not be read; no song is created
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// File-store fault (surfaced generically, logged at the call site)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
