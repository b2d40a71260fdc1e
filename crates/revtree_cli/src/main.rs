//! revtree CLI
//!
//! Command-line tools for revtree sync log files.
//!
//! # Commands
//!
//! - `inspect` - Display sync log revisions and entry counts
//! - `dump-log` - List sync log entries for debugging
//! - `replay` - Re-execute a log and verify it reproduces itself

mod commands;

use clap::{Parser, Subcommand};
use revtree_sync_protocol::EncodingFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// revtree command-line tools.
#[derive(Parser)]
#[command(name = "revtree")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Byte encoding of the log file (cbor, json); guessed from the extension by default
    #[arg(global = true, short, long)]
    encoding: Option<EncodingFormat>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display sync log revisions and entry counts
    Inspect {
        /// Sync log file
        file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List sync log entries
    DumpLog {
        /// Sync log file
        file: PathBuf,

        /// Start from this revision
        #[arg(short, long)]
        since: Option<i64>,

        /// Maximum number of entries to list
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Re-execute every logged command and compare the results
    Replay {
        /// Sync log file
        file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { file, format } => {
            commands::inspect::run(&file, cli.encoding, &format)?;
        }
        Commands::DumpLog {
            file,
            since,
            limit,
            format,
        } => {
            commands::dump_log::run(&file, cli.encoding, since, limit, &format)?;
        }
        Commands::Replay { file, format } => {
            commands::replay::run(&file, cli.encoding, &format)?;
        }
        Commands::Version => {
            println!("revtree CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("revtree core v{}", revtree_core::VERSION);
        }
    }

    Ok(())
}
