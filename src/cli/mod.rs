//! CLI module
//!
//! Command-line interface for the tap.
//!
//! # Commands
//!
//! - `discover` - Print the Singer catalog
//! - `sync` - Extract records as Singer messages
//! - `validate` - Validate an NDJSON record file offline
//! - `streams` - List schemas and syncable streams

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
