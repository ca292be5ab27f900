//! Parsers for toolchain text output.
//!
//! This module handles:
//! - `nm` size tables (address, size, type, source location)
//! - `objdump` disassembly listings
//! - GCC stack usage reports
//! - The symbol model they all feed

pub mod disassembly;
pub mod schema;
pub mod size_table;
pub mod stack_usage;

// Re-export main types
pub use disassembly::{left_strip_lines, parse_assembly_text};
pub use schema::{Address, Symbol, SymbolTable, SymbolType};
pub use size_table::parse_size_line;
pub use stack_usage::{parse_stack_usage_line, StackUsage};
