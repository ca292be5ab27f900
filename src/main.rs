//! Puncover CLI
//!
//! Analyzes code size, call graph and stack usage of a firmware build from
//! previously captured `nm`, `objdump` and `.su` output.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use puncover_core::commands::utils::{display_schema, display_version, validate_report_file};
use puncover_core::commands::{execute_build, validate_args, BuildArgs};
use puncover_core::utils::config::DEFAULT_REPORT_PATH;

/// Puncover - code size and stack usage analysis
#[derive(Parser, Debug)]
#[command(name = "puncover-core")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the symbol model from captured toolchain output
    Build {
        /// `nm --print-size --line-numbers` output
        #[arg(short, long)]
        sizes: Option<PathBuf>,

        /// `objdump --disassemble --line-numbers` output
        #[arg(short, long)]
        disassembly: Option<PathBuf>,

        /// `.su` stack usage file (repeatable)
        #[arg(long = "stack-usage")]
        stack_usage: Vec<PathBuf>,

        /// Make source paths relative to this directory
        #[arg(long, env = "PUNCOVER_SOURCE_ROOT")]
        source_root: Option<String>,

        /// Output path for JSON report
        #[arg(short, long, default_value = DEFAULT_REPORT_PATH)]
        output: PathBuf,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Number of largest functions in the summary
        #[arg(long, default_value = "20")]
        top: usize,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Build {
            sizes,
            disassembly,
            stack_usage,
            source_root,
            output,
            summary,
            top,
        } => {
            let args = BuildArgs {
                sizes,
                disassembly,
                stack_usage,
                source_root,
                output_json: Some(output),
                print_summary: summary,
                top,
            };

            validate_args(&args)?;
            execute_build(args)?;
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
