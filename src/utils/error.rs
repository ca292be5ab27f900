//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while parsing a single line of toolchain output
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed size table line: {0}")]
    MalformedSizeLine(String),

    #[error("Malformed stack usage line: {0}")]
    MalformedStackUsageLine(String),

    #[error("Invalid hex value: {0}")]
    InvalidHex(String),

    #[error("No symbol at {file}:{line}")]
    NoMatchingSymbol { file: String, line: u32 },
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
