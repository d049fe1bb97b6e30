//! Execution engine module
//!
//! Main read loop and stream orchestration.
//!
//! # Overview
//!
//! For each selected stream the engine:
//! - emits the stream's SCHEMA message
//! - fetches pages until the paginator reports the end
//! - validates each page on blocking worker tasks, one chunk per task
//! - emits accepted records in input order, projected by `_select`
//! - logs and counts rejected records

mod types;

pub use types::{StreamStats, SyncConfig, SyncStats};

use crate::decode::JsonDecoder;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::output::{MessageWriter, SingerMessage};
use crate::pagination::{NextPage, NoPaginator, PaginationState, Paginator, StartIndexPaginator};
use crate::schema::{SchemaRegistry, StreamSchema};
use crate::streams::{RequestContext, Selection, StreamDefinition, StreamRequest, StreamSelection};
use crate::types::JsonValue;
use crate::validate::{validate_value, ValidationResult};
use chrono::Utc;
use futures::future::try_join_all;
use reqwest::header::CONTENT_ENCODING;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Sync engine for orchestrating data extraction
pub struct SyncEngine<W: Write> {
    /// HTTP client
    client: HttpClient,
    /// Shared read-only schemas
    registry: Arc<SchemaRegistry>,
    /// `_select` configuration
    selection: Selection,
    /// Request parameters shared by all streams
    context: RequestContext,
    /// Records per page
    page_size: u32,
    /// Singer output
    writer: MessageWriter<W>,
    /// Sync configuration
    config: SyncConfig,
    /// Statistics
    stats: SyncStats,
}

impl<W: Write> SyncEngine<W> {
    /// Create a new sync engine
    pub fn new(
        client: HttpClient,
        registry: Arc<SchemaRegistry>,
        selection: Selection,
        context: RequestContext,
        page_size: u32,
        writer: MessageWriter<W>,
    ) -> Self {
        Self {
            client,
            registry,
            selection,
            context,
            page_size,
            writer,
            config: SyncConfig::default(),
            stats: SyncStats::default(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Flush output and return the writer's sink
    pub fn into_writer(self) -> Result<W> {
        self.writer.into_inner()
    }

    /// Sync every selected stream, in order
    pub async fn sync(&mut self, streams: &[&StreamDefinition]) -> Result<&SyncStats> {
        let start = Instant::now();

        for def in streams {
            if !self.selection.is_selected(def.name) {
                debug!(stream = def.name, "Stream not selected, skipping");
                continue;
            }

            match self.sync_stream(def).await {
                Ok(stats) => self.stats.streams.push(stats),
                Err(e) => {
                    error!(stream = def.name, error = %e, "Stream failed");
                    let mut stats = StreamStats::new(def.name);
                    stats.failed = true;
                    self.stats.streams.push(stats);
                    if self.config.fail_fast {
                        return Err(e);
                    }
                }
            }
        }

        self.stats.set_duration(start.elapsed().as_millis() as u64);
        Ok(&self.stats)
    }

    /// Sync a single stream
    pub async fn sync_stream(&mut self, def: &StreamDefinition) -> Result<StreamStats> {
        let start = Instant::now();
        let mut stats = StreamStats::new(def.name);

        let schema = self.registry.get_shared(def.name)?;
        let selection = self.selection.for_stream(def.name);
        let request = StreamRequest::for_stream(def, &self.context);
        let decoder = JsonDecoder::with_path(def.records_path);
        let paginator: Box<dyn Paginator> = if def.is_report() {
            Box::new(NoPaginator {
                page_size: self.page_size,
            })
        } else {
            Box::new(StartIndexPaginator::new(self.page_size))
        };

        info!(stream = def.name, method = ?request.method, path = %request.path, "Starting sync");

        self.writer.write(&SingerMessage::schema(
            def.name,
            schema.document().clone(),
            def.primary_keys,
            def.replication_key.as_slice(),
        ))?;
        self.writer.flush()?;

        let mut page = paginator.first_page();
        let mut pagination = PaginationState::new();

        loop {
            let response = self
                .client
                .request(request.method.into(), &request.path, request.page(&page))
                .await?;

            let encoding = response
                .headers()
                .get(CONTENT_ENCODING)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string);
            let bytes = response.bytes().await?;
            let raw = decoder.parse(&bytes, encoding.as_deref())?;

            let mut records = decoder.extract_records(&raw)?;
            if self.config.max_records > 0 {
                let remaining = self.config.max_records.saturating_sub(stats.records_fetched);
                records.truncate(remaining);
            }

            stats.add_page(records.len());
            pagination.add_page(records.len());
            debug!(
                stream = def.name,
                page = stats.pages,
                start_index = page.start_index,
                records = records.len(),
                "Fetched page"
            );

            let results = validate_page(Arc::clone(&schema), records, self.config.chunk_size).await?;
            emit_results(
                &mut self.writer,
                def.name,
                &def.key_properties().collect::<Vec<_>>(),
                &selection,
                results,
                &mut stats,
            )?;
            self.writer.flush()?;

            if self.config.max_records > 0 && stats.records_fetched >= self.config.max_records {
                debug!(stream = def.name, "Reached max records");
                break;
            }

            match paginator.next_page(&raw, &page) {
                NextPage::Continue(next) => page = next,
                NextPage::Done => break,
            }
        }
        pagination.mark_done();

        stats.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            stream = def.name,
            pages = pagination.pages,
            fetched = pagination.total_fetched,
            emitted = stats.emitted,
            rejected = stats.rejected,
            warnings = stats.warnings,
            duration_ms = stats.duration_ms,
            "Completed sync"
        );

        Ok(stats)
    }
}

/// Validate a page of records against a stream schema.
///
/// Records are split into chunks of `chunk_size`; each chunk is validated
/// on a blocking worker task. Results come back in input order.
pub async fn validate_page(
    schema: Arc<StreamSchema>,
    records: Vec<JsonValue>,
    chunk_size: usize,
) -> Result<Vec<ValidationResult>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::with_capacity(records.len().div_ceil(chunk_size));
    let mut records = records.into_iter().peekable();
    while records.peek().is_some() {
        chunks.push(records.by_ref().take(chunk_size).collect::<Vec<_>>());
    }

    let tasks = chunks.into_iter().map(|chunk| {
        let schema = Arc::clone(&schema);
        tokio::task::spawn_blocking(move || {
            chunk
                .iter()
                .map(|record| validate_value(&schema, record))
                .collect::<Vec<_>>()
        })
    });

    let validated = try_join_all(tasks)
        .await
        .map_err(|e| Error::Other(format!("Validation task failed: {e}")))?;

    Ok(validated.into_iter().flatten().collect())
}

/// Emit accepted records and account for rejected ones
pub(crate) fn emit_results<W: Write>(
    writer: &mut MessageWriter<W>,
    stream: &str,
    always_keep: &[&str],
    selection: &StreamSelection,
    results: Vec<ValidationResult>,
    stats: &mut StreamStats,
) -> Result<()> {
    let extracted = Utc::now();

    for (index, result) in results.into_iter().enumerate() {
        stats.warnings += result.warnings.len();
        for issue in &result.warnings {
            debug!(stream, index, %issue, "Validation warning");
        }

        if !result.is_valid() {
            stats.rejected += 1;
            let errors = result
                .errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            warn!(stream, index, %errors, "Record rejected");
            continue;
        }

        let record = selection.project(result.record_json(), always_keep.iter().copied());
        writer.write(&SingerMessage::record(stream, record, extracted))?;
        stats.emitted += 1;
    }

    Ok(())
}
