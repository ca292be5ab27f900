//! Output writers for the collected model.
//!
//! This module handles:
//! - Building a serializable report snapshot of a collector
//! - Writing and reading that report as JSON

pub mod json;
pub mod report;

// Re-export main functions
pub use json::{read_report, write_report};
pub use report::{to_report, Report};

use crate::utils::error::OutputError;
use std::path::Path;

/// Common path validation for output files
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}
