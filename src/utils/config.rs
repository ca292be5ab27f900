//! Configuration and constants for the collector and CLI.

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Minimum number of hex digits used when rendering an address
pub const ADDRESS_WIDTH: usize = 8;

/// Default output path for the JSON report
pub const DEFAULT_REPORT_PATH: &str = "puncover.json";

/// Folder that owns files whose path has no directory component
pub const CURRENT_FOLDER: &str = ".";

// ARM condition codes accepted after `b`/`bl`/`blx`
pub const BRANCH_CONDITIONS: &[&str] = &[
    "eq", "ne", "cs", "hs", "cc", "lo", "mi", "pl", "vs", "vc", "hi", "ls", "ge", "lt", "gt", "le",
    "al",
];

/// Runtime options for a collector build
#[derive(Debug, Clone, Default)]
pub struct CollectorConfig {
    /// When set, symbol paths below this directory are made relative to it
    pub source_root: Option<String>,
}

impl CollectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_root(mut self, root: impl Into<String>) -> Self {
        self.source_root = Some(root.into());
        self
    }
}
