use crate::output::read_report;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::Result;
use std::path::PathBuf;

/// Validate a report JSON file
pub fn validate_report_file(file_path: PathBuf) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(&file_path)?;

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Generated: {}", report.generated_at);
    println!("  Symbols: {}", report.symbols.len());
    println!("  Functions: {}", report.function_count());
    println!("  Total Size: {} bytes", report.total_size());
    println!("  Files: {}", report.files.len());

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Puncover Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string           - Schema version (e.g., '1.0.0')");
        println!("  generated_at: string      - ISO 8601 timestamp");
        println!("  stats: object             - Parsed/skipped line counters");
        println!("  symbols: array            - Functions and variables by address");
        println!("    address: string         - Zero-padded hex address");
        println!("    name: string            - Symbol name");
        println!("    type: string            - 'function' or 'variable'");
        println!("    size: number?           - Size in bytes");
        println!("    path, base_file, line   - Source location (if available)");
        println!("    stack_size: number?     - Stack frame size in bytes");
        println!("    callers, callees: array? - Call graph neighbors");
        println!("    prev_function, next_function: string? - Address neighbors");
        println!("  files: array              - Source files and their symbols");
        println!("  folders: array            - Folder hierarchy with collapsed view");
        println!("  collapsed_root_folders: array - Display roots");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Puncover v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Code size, call graph and stack usage analysis for GCC/binutils builds.");
}
