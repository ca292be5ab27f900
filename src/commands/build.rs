//! Build command implementation.
//!
//! The build command:
//! 1. Reads the captured toolchain output files
//! 2. Runs the collector pipeline
//! 3. Writes the JSON report
//! 4. Optionally prints a summary

use crate::collector::{Collector, ToolchainOutput};
use crate::commands::models::BuildArgs;
use crate::output::{to_report, write_report};
use crate::parser::schema::Symbol;
use anyhow::{Context, Result};
use log::info;
use std::path::Path;
use std::time::Instant;

/// Execute the build command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Input files that cannot be read
/// * Report write errors
pub fn execute_build(args: BuildArgs) -> Result<Collector> {
    let start_time = Instant::now();

    let output = load_toolchain_output(&args)?;
    let collector = Collector::build(args.collector_config(), &output);

    let stats = collector.stats();
    info!(
        "Parsed {} size lines ({} skipped), {} disassembled symbols, {} stack usage lines ({} unmatched)",
        stats.size_lines_parsed,
        stats.size_lines_skipped,
        stats.assembly_symbols,
        stats.stack_usage_parsed,
        stats.stack_usage_skipped
    );

    if let Some(path) = &args.output_json {
        let report = to_report(&collector);
        write_report(&report, path).context("Failed to write report JSON")?;
        info!("✓ Report written to: {}", path.display());
    }

    if args.print_summary {
        print_summary(&collector, args.top);
    }

    info!(
        "Build completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(collector)
}

/// Read every input file named in `args`
///
/// **Public** - also useful for driving the collector from tests
pub fn load_toolchain_output(args: &BuildArgs) -> Result<ToolchainOutput> {
    let mut output = ToolchainOutput::default();

    if let Some(path) = &args.sizes {
        output.sizes = read_input(path, "size table")?;
    }
    if let Some(path) = &args.disassembly {
        output.disassembly = read_input(path, "disassembly")?;
    }
    for path in &args.stack_usage {
        output.stack_usage.push(read_input(path, "stack usage")?);
    }

    Ok(output)
}

fn read_input(path: &Path, kind: &str) -> Result<String> {
    info!("Reading {} from {}", kind, path.display());
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file {}", kind, path.display()))
}

/// Validate build arguments
///
/// **Public** - can be called before execute_build for early validation
pub fn validate_args(args: &BuildArgs) -> Result<()> {
    if args.sizes.is_none() && args.disassembly.is_none() && args.stack_usage.is_empty() {
        anyhow::bail!("At least one of --sizes, --disassembly or --stack-usage is required");
    }

    let inputs = args
        .sizes
        .iter()
        .chain(args.disassembly.iter())
        .chain(args.stack_usage.iter());
    for path in inputs {
        if !path.is_file() {
            anyhow::bail!("Input file does not exist: {}", path.display());
        }
    }

    if args.top == 0 {
        anyhow::bail!("top must be greater than 0");
    }

    if args.source_root.as_deref() == Some("") {
        anyhow::bail!("Source root cannot be empty");
    }

    Ok(())
}

/// Print a human-readable summary to stdout.
fn print_summary(collector: &Collector, top: usize) {
    let mut functions: Vec<&Symbol> = collector.functions().collect();
    functions.sort_by(|a, b| b.size.unwrap_or(0).cmp(&a.size.unwrap_or(0)));

    let code: u64 = functions.iter().filter_map(|s| s.size).sum();
    let data: u64 = collector.variables().filter_map(|s| s.size).sum();

    println!();
    println!("Symbols:   {}", collector.symbols().len());
    println!("Files:     {}", collector.tree().files().count());
    println!("Code size: {} bytes", code);
    println!("Data size: {} bytes", data);
    println!();
    println!("Top {} functions by size:", top.min(functions.len()));
    for symbol in functions.iter().take(top) {
        let stack = symbol
            .stack_size
            .map(|s| format!("{:>6}", s))
            .unwrap_or_else(|| format!("{:>6}", "-"));
        let callers = symbol.callers.as_ref().map_or(0, |c| c.len());
        println!(
            "  {} {:>8} {} {:>4} callers  {}",
            symbol.address,
            symbol.size.unwrap_or(0),
            stack,
            callers,
            symbol.name
        );
    }

    println!();
    println!("Folders:");
    for folder in collector.collapsed_root_folders() {
        println!("  {}/ ({} files)", folder.collapsed_name, folder.files.len());
    }
}
