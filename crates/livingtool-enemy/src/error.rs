//! Error types for enemy decoding.

use thiserror::Error;

/// Errors that can occur when decoding enemy files.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Read error from the binary reader.
    #[error(transparent)]
    Common(#[from] livingtool_common::Error),

    /// File too short for the pointer header.
    #[error("file too short: {len} bytes, header needs {needed}")]
    TooShort { len: usize, needed: usize },

    /// The name pointer leaves the file.
    #[error("name offset {offset:#x} is outside the file ({len} bytes)")]
    NameOutOfRange { offset: u64, len: usize },
}

/// Result type for enemy operations.
pub type Result<T> = std::result::Result<T, Error>;
