//! CLI command implementations.
//!
//! Commands orchestrate the various library components to perform user tasks.

pub mod build;
pub mod models;
pub mod utils;

// Re-export main command functions
pub use build::{execute_build, load_toolchain_output, validate_args};
pub use models::BuildArgs;
