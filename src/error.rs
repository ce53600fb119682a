//! Error types for the nawba library.
//!
//! All failures in the pipeline are represented by the [`NawbaError`] enum.
//! Every variant aborts the current run; nothing is retried or silently
//! replaced by a default.
//!
//! # Examples
//!
//! ```
//! use nawba::error::{NawbaError, Result};
//!
//! fn lookup() -> Result<()> {
//!     Err(NawbaError::unmapped_key("recording 'r7' has no class"))
//! }
//!
//! match lookup() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for nawba operations.
#[derive(Error, Debug)]
pub enum NawbaError {
    /// The recording collection or the derived vocabulary is empty.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A recording has no distinct local tokens to normalise by.
    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    /// A category or identifier is missing from a lookup map.
    #[error("Unmapped key: {0}")]
    UnmappedKey(String),

    /// Train and test feature columns diverge.
    #[error("Column mismatch: {0}")]
    ColumnMismatch(String),

    /// Arguments that cannot be combined (mismatched lengths, degenerate splits).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Analysis-related errors (tokenization patterns).
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with NawbaError.
pub type Result<T> = std::result::Result<T, NawbaError>;

impl NawbaError {
    /// Create a new empty input error.
    pub fn empty_input<S: Into<String>>(msg: S) -> Self {
        NawbaError::EmptyInput(msg.into())
    }

    /// Create a new division by zero error.
    pub fn division_by_zero<S: Into<String>>(msg: S) -> Self {
        NawbaError::DivisionByZero(msg.into())
    }

    /// Create a new unmapped key error.
    pub fn unmapped_key<S: Into<String>>(msg: S) -> Self {
        NawbaError::UnmappedKey(msg.into())
    }

    /// Create a new column mismatch error.
    pub fn column_mismatch<S: Into<String>>(msg: S) -> Self {
        NawbaError::ColumnMismatch(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        NawbaError::InvalidArgument(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        NawbaError::Analysis(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        NawbaError::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = NawbaError::empty_input("no recordings");
        assert_eq!(error.to_string(), "Empty input: no recordings");

        let error = NawbaError::unmapped_key("mbid-1");
        assert_eq!(error.to_string(), "Unmapped key: mbid-1");

        let error = NawbaError::column_mismatch("3 != 4");
        assert_eq!(error.to_string(), "Column mismatch: 3 != 4");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let nawba_error = NawbaError::from(io_error);

        match nawba_error {
            NawbaError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
