//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Singer tap for the Amazon Ads API
#[derive(Parser, Debug)]
#[command(name = "tap-amazonads")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON or YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format for discover and streams
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the Singer catalog
    Discover,

    /// Extract records and write Singer messages to stdout
    Sync {
        /// Streams to sync (comma-separated, empty = all selected)
        #[arg(long)]
        streams: Option<String>,

        /// Maximum records per stream
        #[arg(long)]
        max_records: Option<usize>,

        /// Keep going when a stream fails
        #[arg(long)]
        continue_on_error: bool,
    },

    /// Validate an NDJSON record file against a stream schema
    Validate {
        /// Stream whose schema to validate against
        #[arg(long)]
        stream: String,

        /// Input file (`-` or absent = stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write a per-record JSON report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List registered schemas and syncable streams
    Streams,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
