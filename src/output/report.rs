//! Serializable snapshot of a collector run.
//!
//! The report is what downstream viewers consume. Schema is versioned to
//! allow future evolution.

use crate::aggregator::{Folder, SourceFile};
use crate::collector::{Collector, ParseStats};
use crate::parser::schema::Symbol;
use crate::utils::config::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Schema version for compatibility checking
    pub version: String,

    /// Timestamp when the report was generated
    pub generated_at: String,

    pub stats: ParseStats,

    /// All symbols in address order
    pub symbols: Vec<Symbol>,

    pub files: Vec<SourceFile>,

    pub folders: Vec<Folder>,

    /// Paths of the display roots of the collapsed folder tree
    pub collapsed_root_folders: Vec<String>,
}

impl Report {
    pub fn function_count(&self) -> usize {
        self.symbols.iter().filter(|s| s.is_function()).count()
    }

    /// Sum of all known symbol sizes
    pub fn total_size(&self) -> u64 {
        self.symbols.iter().filter_map(|s| s.size).sum()
    }
}

/// Snapshot the collector's model into a report
///
/// **Public** - used by commands to create final output
pub fn to_report(collector: &Collector) -> Report {
    use chrono::Utc;

    Report {
        version: SCHEMA_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        stats: collector.stats(),
        symbols: collector.symbols().iter().cloned().collect(),
        files: collector.tree().files().cloned().collect(),
        folders: collector.tree().folders().cloned().collect(),
        collapsed_root_folders: collector
            .collapsed_root_folders()
            .into_iter()
            .map(|f| f.path.clone())
            .collect(),
    }
}
