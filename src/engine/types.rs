//! Engine types
//!
//! Configuration and statistics for the sync engine.

use serde::Serialize;

/// Configuration for sync operation
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Records validated per blocking task
    pub chunk_size: usize,
    /// Maximum records to fetch per stream (0 = unlimited)
    pub max_records: usize,
    /// Whether a failing stream aborts the whole sync
    pub fail_fast: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            chunk_size: 256,
            max_records: 0,
            fail_fast: true,
        }
    }
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set validation chunk size
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Set max records
    #[must_use]
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = max;
        self
    }

    /// Set fail fast mode
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

/// Statistics for one stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    /// Stream name
    pub stream: String,
    /// Pages fetched
    pub pages: usize,
    /// Records received from the API
    pub records_fetched: usize,
    /// Records emitted
    pub emitted: usize,
    /// Records rejected by validation
    pub rejected: usize,
    /// Warning-severity issues across all records
    pub warnings: usize,
    /// Whether the stream failed
    pub failed: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl StreamStats {
    /// Create stats for a stream
    pub fn new(stream: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
            ..Default::default()
        }
    }

    /// Add a page
    pub fn add_page(&mut self, records: usize) {
        self.pages += 1;
        self.records_fetched += records;
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncStats {
    /// Per-stream statistics, in sync order
    pub streams: Vec<StreamStats>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Total records emitted
    pub fn emitted(&self) -> usize {
        self.streams.iter().map(|s| s.emitted).sum()
    }

    /// Total records rejected
    pub fn rejected(&self) -> usize {
        self.streams.iter().map(|s| s.rejected).sum()
    }

    /// Total pages fetched
    pub fn pages(&self) -> usize {
        self.streams.iter().map(|s| s.pages).sum()
    }

    /// Streams that failed
    pub fn failed(&self) -> usize {
        self.streams.iter().filter(|s| s.failed).count()
    }

    /// Stats for one stream
    pub fn stream(&self, name: &str) -> Option<&StreamStats> {
        self.streams.iter().find(|s| s.stream == name)
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
