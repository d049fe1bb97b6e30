//! Singer message writer
//!
//! Writes one JSON message per line. Output is buffered and flushed
//! explicitly, once per page of records.

use super::message::SingerMessage;
use crate::error::{Error, Result};
use std::io::{BufWriter, Stdout, Write};

/// Newline-delimited Singer message writer
pub struct MessageWriter<W: Write> {
    /// Buffered sink
    writer: BufWriter<W>,
}

impl MessageWriter<Stdout> {
    /// Writer on standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> MessageWriter<W> {
    /// Create a new writer
    pub fn new(inner: W) -> Self {
        Self {
            writer: BufWriter::new(inner),
        }
    }

    /// Write a single message
    pub fn write(&mut self, message: &SingerMessage) -> Result<()> {
        serde_json::to_writer(&mut self.writer, message).map_err(|e| {
            Error::output(format!("Failed to serialize {} message: {e}", message.stream()))
        })?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Flush buffered output
    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| Error::output(format!("Failed to flush output: {e}")))
    }

    /// Flush and return the underlying sink
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| Error::output(format!("Failed to flush output: {}", e.error())))
    }
}
