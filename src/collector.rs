//! The collector owns the symbol table and the source tree and runs the
//! parsing and enhancement passes in their fixed order:
//!
//! 1. size table lines (`nm`)
//! 2. disassembly listing (`objdump`)
//! 3. stack usage lines (`.su`)
//! 4. call graph and branch annotation
//! 5. sibling links and size inference
//! 6. source files and folders

use crate::aggregator::{
    annotate_branch_targets, build_call_graph, infer_function_sizes, link_siblings, Folder,
    SourceFile, SourceTree,
};
use crate::parser::schema::{Address, Symbol, SymbolTable, SymbolType};
use crate::parser::{disassembly, size_table, stack_usage};
use crate::utils::config::CollectorConfig;
use crate::utils::error::ParseError;
use crate::utils::path::relative_to;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Raw text captured from the toolchain
#[derive(Debug, Clone, Default)]
pub struct ToolchainOutput {
    /// `nm --print-size --line-numbers` output
    pub sizes: String,
    /// `objdump --disassemble --line-numbers` output
    pub disassembly: String,
    /// Contents of every `.su` file
    pub stack_usage: Vec<String>,
}

/// Line counters for one collector run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    pub size_lines_parsed: usize,
    pub size_lines_skipped: usize,
    pub assembly_symbols: usize,
    pub stack_usage_parsed: usize,
    pub stack_usage_skipped: usize,
    pub call_edges: usize,
}

/// Aggregate model of one compiled program
#[derive(Debug, Clone, Default)]
pub struct Collector {
    config: CollectorConfig,
    symbols: SymbolTable,
    tree: SourceTree,
    stats: ParseStats,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CollectorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Start from an existing symbol table (useful to run single passes)
    pub fn from_symbols(symbols: SymbolTable) -> Self {
        Self {
            symbols,
            ..Self::default()
        }
    }

    /// Run the full pipeline over captured toolchain output
    ///
    /// **Public** - main entry point
    pub fn build(config: CollectorConfig, output: &ToolchainOutput) -> Self {
        let mut collector = Self::with_config(config);

        info!("Parsing size table...");
        collector.parse_size_output(&output.sizes);

        info!("Parsing disassembly...");
        collector.parse_assembly_text(&output.disassembly);

        info!("Parsing stack usage...");
        for report in &output.stack_usage {
            collector.parse_stack_usage_output(report);
        }

        collector.enhance();
        collector
    }

    /// Parse a single size table line
    pub fn parse_size_line(&mut self, line: &str) -> Result<Address, ParseError> {
        size_table::parse_size_line(&mut self.symbols, line)
    }

    /// Parse every line of an `nm` dump, skipping the ones without location
    ///
    /// # Returns
    /// Number of lines that produced a symbol
    pub fn parse_size_output(&mut self, text: &str) -> usize {
        let mut parsed = 0;
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            match self.parse_size_line(line) {
                Ok(_) => parsed += 1,
                Err(e) => {
                    debug!("Skipping size line: {}", e);
                    self.stats.size_lines_skipped += 1;
                }
            }
        }
        self.stats.size_lines_parsed += parsed;
        parsed
    }

    /// Parse a disassembly listing
    ///
    /// # Returns
    /// Number of symbol headers found
    pub fn parse_assembly_text(&mut self, assembly: &str) -> usize {
        let found = disassembly::parse_assembly_text(&mut self.symbols, assembly);
        self.stats.assembly_symbols += found;
        found
    }

    /// Parse a single stack usage line and attach it to its symbol
    pub fn parse_stack_usage_line(&mut self, line: &str) -> Result<Address, ParseError> {
        stack_usage::parse_stack_usage_line(&mut self.symbols, line)
    }

    /// Parse all lines of one `.su` report
    ///
    /// # Returns
    /// Number of lines attached to a symbol
    pub fn parse_stack_usage_output(&mut self, text: &str) -> usize {
        let mut parsed = 0;
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            match self.parse_stack_usage_line(line) {
                Ok(_) => parsed += 1,
                Err(e) => {
                    debug!("Skipping stack usage line: {}", e);
                    self.stats.stack_usage_skipped += 1;
                }
            }
        }
        self.stats.stack_usage_parsed += parsed;
        parsed
    }

    /// Run all enhancement passes in order
    ///
    /// Safe to call repeatedly.
    pub fn enhance(&mut self) {
        if let Some(root) = self.config.source_root.clone() {
            self.relativize_paths(&root);
        }

        info!("Enhancing call tree...");
        self.enhance_call_tree();
        self.enhance_assembly();

        info!("Enhancing siblings and function sizes...");
        self.enhance_sibling_symbols();
        self.enhance_function_size_from_assembly();

        info!("Deriving files and folders...");
        self.derive_folders();

        info!(
            "Collected {} symbols in {} files",
            self.symbols.len(),
            self.tree.files().count()
        );
    }

    /// Rewrite symbol paths below `root` relative to it
    pub fn relativize_paths(&mut self, root: &str) {
        for symbol in self.symbols.iter_mut() {
            let Some(path) = symbol.path.as_deref() else {
                continue;
            };
            if let Some(relative) = relative_to(path, root) {
                symbol.set_path(&relative);
            }
        }
    }

    pub fn enhance_call_tree(&mut self) {
        self.stats.call_edges = build_call_graph(&mut self.symbols);
    }

    /// Label branch targets that objdump printed as bare addresses
    pub fn enhance_assembly(&mut self) {
        let rewritten = annotate_branch_targets(&mut self.symbols);
        debug!("Annotated {} branch instructions", rewritten);
    }

    pub fn enhance_sibling_symbols(&mut self) {
        link_siblings(&mut self.symbols);
    }

    pub fn enhance_function_size_from_assembly(&mut self) {
        let inferred = infer_function_sizes(&mut self.symbols);
        debug!("Inferred size of {} symbols", inferred);
    }

    /// Group symbols into files and build the collapsed folder view
    pub fn derive_folders(&mut self) {
        self.tree.derive_files(&mut self.symbols);
        self.tree.collapse();
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn tree(&self) -> &SourceTree {
        &self.tree
    }

    pub fn symbol(&self, address: &Address) -> Option<&Symbol> {
        self.symbols.get(address)
    }

    /// Look up a symbol by hex address, padded or not (`"9c"`, `"0000009c"`)
    pub fn symbol_by_addr(&self, address: &str) -> Option<&Symbol> {
        let address: Address = address.parse().ok()?;
        self.symbols.get(&address)
    }

    /// Case-insensitive substring search over symbol names
    pub fn search(&self, query: &str) -> Vec<&Symbol> {
        let query = query.to_lowercase();
        self.symbols
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&query))
            .collect()
    }

    pub fn functions(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.functions()
    }

    pub fn variables(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols
            .iter()
            .filter(|s| s.symbol_type == SymbolType::Variable)
    }

    pub fn file(&self, path: &str) -> Option<&SourceFile> {
        self.tree.file(path)
    }

    pub fn folder(&self, path: &str) -> Option<&Folder> {
        self.tree.folder(path)
    }

    /// Symbols defined in the file at `path`, in address order
    pub fn symbols_in_file(&self, path: &str) -> Vec<&Symbol> {
        self.file(path)
            .map(|file| self.resolve(file.symbols.iter()))
            .unwrap_or_default()
    }

    pub fn root_folders(&self) -> Vec<&Folder> {
        self.tree.root_folders()
    }

    pub fn collapsed_root_folders(&self) -> Vec<&Folder> {
        self.tree.collapsed_root_folders()
    }

    /// Symbols calling `address`; `None` before the call graph is built
    pub fn callers(&self, address: &Address) -> Option<Vec<&Symbol>> {
        let callers = self.symbols.get(address)?.callers.as_ref()?;
        Some(self.resolve(callers.iter()))
    }

    /// Symbols called by `address`; `None` before the call graph is built
    pub fn callees(&self, address: &Address) -> Option<Vec<&Symbol>> {
        let callees = self.symbols.get(address)?.callees.as_ref()?;
        Some(self.resolve(callees.iter()))
    }

    pub fn prev_function(&self, address: &Address) -> Option<&Symbol> {
        let prev = self.symbols.get(address)?.prev_function?;
        self.symbols.get(&prev)
    }

    pub fn next_function(&self, address: &Address) -> Option<&Symbol> {
        let next = self.symbols.get(address)?.next_function?;
        self.symbols.get(&next)
    }

    fn resolve<'a>(&'a self, addresses: impl Iterator<Item = &'a Address>) -> Vec<&'a Symbol> {
        addresses.filter_map(|a| self.symbols.get(a)).collect()
    }
}
