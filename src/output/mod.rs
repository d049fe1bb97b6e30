//! Output module
//!
//! Singer messages on standard output.
//!
//! # Overview
//!
//! - `SCHEMA` once per stream, before any of its records
//! - `RECORD` per accepted record, with the extraction time
//!
//! Messages are newline-delimited JSON. Logs never go to stdout.

mod message;
mod writer;

pub use message::SingerMessage;
pub use writer::MessageWriter;
