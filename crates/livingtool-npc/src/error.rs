//! Error types for NPC decoding.

use thiserror::Error;

/// Errors that can occur when loading NPC files.
///
/// Decoding itself is infallible; only reading the file can fail.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for NPC operations.
pub type Result<T> = std::result::Result<T, Error>;
