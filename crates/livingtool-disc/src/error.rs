//! Error types for disc extraction.

use thiserror::Error;

/// Errors that can occur while extracting a disc image.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A sector payload ran past the end of the image.
    #[error("truncated read at sector {sector}: expected {expected} bytes, got {actual}")]
    TruncatedSector {
        sector: i64,
        expected: usize,
        actual: usize,
    },

    /// An index entry that cannot address the image.
    #[error("invalid index entry: sector {sector}, {size} sectors")]
    InvalidEntry { sector: i32, size: i32 },

    /// A requested file section ran past the end of the file.
    #[error("section {start:#x}..{end:#x} is not readable: {reason}")]
    InvalidSection {
        start: u64,
        end: u64,
        reason: String,
    },

    /// Malformed file name template.
    #[error("invalid file name template: {0}")]
    InvalidTemplate(String),

    /// Malformed category table.
    #[error("invalid category table: {0}")]
    InvalidCategoryTable(String),

    /// Category table JSON could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for disc operations.
pub type Result<T> = std::result::Result<T, Error>;
