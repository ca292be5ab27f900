//! Puncover core
//!
//! Builds a cross-referenced model of a compiled program from GNU toolchain
//! text output: symbol sizes from `nm`, instructions and call edges from
//! `objdump`, stack frame sizes from GCC `.su` reports, and the source
//! folder hierarchy all symbols live in.
//!
//! ## Getting Started
//!
//! ```ignore
//! use puncover_core::collector::{Collector, ToolchainOutput};
//! use puncover_core::utils::config::CollectorConfig;
//!
//! let output = ToolchainOutput {
//!     sizes: nm_text,
//!     disassembly: objdump_text,
//!     stack_usage: vec![su_text],
//! };
//! let collector = Collector::build(CollectorConfig::new(), &output);
//! let main = collector.search("main");
//! ```

pub mod aggregator;
pub mod collector;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;

pub use collector::{Collector, ParseStats, ToolchainOutput};
