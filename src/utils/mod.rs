//! Utility modules for configuration, error handling, and path handling.

pub mod config;
pub mod error;
pub mod path;

// Re-export commonly used error types for convenience
pub use error::{OutputError, ParseError};
