//! Enhancement passes over the parsed symbol table.
//!
//! This module transforms parsed symbols into a cross-referenced model:
//! - Call graph edges from branch instructions
//! - Address-order sibling links and inferred function sizes
//! - Source files and the (collapsed) folder hierarchy

pub mod call_graph;
pub mod siblings;
pub mod source_tree;

// Re-export main types and functions
pub use call_graph::{annotate_branch_targets, build_call_graph};
pub use siblings::{count_code_bytes, infer_function_sizes, link_siblings};
pub use source_tree::{Folder, SourceFile, SourceTree};
