use crate::utils::config::CollectorConfig;
use std::path::PathBuf;

/// Arguments for the build command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct BuildArgs {
    /// Captured `nm --print-size --line-numbers` output
    pub sizes: Option<PathBuf>,

    /// Captured `objdump --disassemble --line-numbers` output
    pub disassembly: Option<PathBuf>,

    /// `.su` files produced by `-fstack-usage`
    pub stack_usage: Vec<PathBuf>,

    /// Make source paths relative to this directory
    pub source_root: Option<String>,

    /// Output path for the JSON report (optional)
    pub output_json: Option<PathBuf>,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Number of largest functions listed in the summary
    pub top: usize,
}

impl BuildArgs {
    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            source_root: self.source_root.clone(),
        }
    }
}

impl Default for BuildArgs {
    fn default() -> Self {
        Self {
            sizes: None,
            disassembly: None,
            stack_usage: Vec::new(),
            source_root: None,
            output_json: None,
            print_summary: false,
            top: 20,
        }
    }
}
