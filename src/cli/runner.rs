//! CLI runner - executes commands

use crate::auth::{AuthConfig, Authenticator};
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::TapConfig;
use crate::engine::{emit_results, validate_page, StreamStats, SyncConfig, SyncEngine};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig};
use crate::output::{MessageWriter, SingerMessage};
use crate::schema::{SchemaRegistry, StreamSchema};
use crate::streams::{
    find_stream, Catalog, RequestContext, Selection, StreamDefinition, STREAMS,
};
use crate::validate::{FieldIssue, ValidationResult};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Records validated per blocking task in `validate` mode
const VALIDATE_CHUNK_SIZE: usize = 512;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Discover => self.discover(),
            Commands::Sync {
                streams,
                max_records,
                continue_on_error,
            } => {
                self.sync(streams.as_deref(), *max_records, *continue_on_error)
                    .await
            }
            Commands::Validate {
                stream,
                input,
                report,
            } => {
                self.validate(stream, input.as_deref(), report.as_deref())
                    .await
            }
            Commands::Streams => self.streams(),
        }
    }

    /// Load the configuration file given with `-c`
    fn load_config(&self) -> Result<TapConfig> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Configuration file not specified (use -c flag)"))?;
        let config = TapConfig::from_file(path)?;
        debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// Print the Singer catalog
    fn discover(&self) -> Result<()> {
        let registry = SchemaRegistry::shared()?;
        let selection = match &self.cli.config {
            Some(_) => Selection::parse(&self.load_config()?.select)?,
            None => Selection::all(),
        };

        let catalog = Catalog::discover(&registry, &selection)?;
        self.output_message(&serde_json::to_value(&catalog)?);
        Ok(())
    }

    /// List registered schemas and syncable streams
    fn streams(&self) -> Result<()> {
        let registry = SchemaRegistry::shared()?;
        let syncable: Vec<&str> = STREAMS.iter().map(|s| s.name).collect();

        self.output_message(&json!({
            "type": "STREAMS",
            "streams": syncable,
            "schemas": registry.stream_names().collect::<Vec<_>>(),
        }));
        Ok(())
    }

    /// Run extraction
    async fn sync(
        &self,
        streams: Option<&str>,
        max_records: Option<usize>,
        continue_on_error: bool,
    ) -> Result<()> {
        let sync_start = Instant::now();
        let config = self.load_config()?;
        let registry = SchemaRegistry::shared()?;
        let selection = Selection::parse(&config.select)?;
        let targets = resolve_streams(streams)?;

        let authenticator = Authenticator::new(AuthConfig::from(&config));
        let http_config = HttpClientConfig::builder()
            .base_url(config.api_url())
            .build();
        let client = HttpClient::with_auth(http_config, authenticator)?;

        let context = RequestContext {
            ad_product: config.ad_product,
            start_date: config.start_date()?.date_naive(),
            end_date: Utc::now().date_naive(),
            user_agent: config.user_agent.clone(),
        };

        let sync_config = SyncConfig::new()
            .with_max_records(max_records.unwrap_or(0))
            .with_fail_fast(!continue_on_error);

        info!(
            region = %config.region,
            ad_product = %config.ad_product,
            streams = targets.len(),
            "Starting sync"
        );

        let mut engine = SyncEngine::new(
            client,
            registry,
            selection,
            context,
            config.page_size as u32,
            MessageWriter::stdout(),
        )
        .with_config(sync_config);

        let stats = engine.sync(&targets).await?.clone();
        engine.into_writer()?;

        for stream in &stats.streams {
            info!(
                stream = %stream.stream,
                pages = stream.pages,
                emitted = stream.emitted,
                rejected = stream.rejected,
                warnings = stream.warnings,
                failed = stream.failed,
                "Stream summary"
            );
        }
        info!(
            emitted = stats.emitted(),
            rejected = stats.rejected(),
            duration_ms = sync_start.elapsed().as_millis() as u64,
            "Sync complete"
        );

        if stats.failed() > 0 {
            return Err(Error::Other(format!(
                "{} stream(s) failed",
                stats.failed()
            )));
        }
        Ok(())
    }

    /// Validate an NDJSON file offline
    async fn validate(
        &self,
        stream: &str,
        input: Option<&Path>,
        report_path: Option<&Path>,
    ) -> Result<()> {
        let registry = SchemaRegistry::shared()?;
        let schema = registry.get_shared(stream)?;

        let reader: Box<dyn Read> = match input {
            Some(path) if path != Path::new("-") => {
                if !path.exists() {
                    return Err(Error::FileNotFound {
                        path: path.display().to_string(),
                    });
                }
                Box::new(std::fs::File::open(path)?)
            }
            _ => Box::new(std::io::stdin()),
        };
        let input = read_ndjson(reader)?;

        let mut writer = MessageWriter::stdout();
        validate_input(stream, schema, input, &mut writer, report_path).await?;

        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Validate parsed NDJSON against a stream schema, emit Singer messages for
/// the accepted records and optionally write a per-record report.
async fn validate_input<W: Write>(
    stream: &str,
    schema: Arc<StreamSchema>,
    input: NdjsonInput,
    writer: &mut MessageWriter<W>,
    report_path: Option<&Path>,
) -> Result<StreamStats> {
    let results = validate_page(schema.clone(), input.records, VALIDATE_CHUNK_SIZE).await?;

    // The report borrows the results, so it is written before they are emitted
    let total = {
        let report = ValidationReport::new(stream, &input.lines, &input.unparsable, &results);
        if let Some(path) = report_path {
            let mut file = std::fs::File::create(path)?;
            serde_json::to_writer_pretty(&mut file, &report)?;
            file.write_all(b"\n")?;
            info!(path = %path.display(), "Wrote validation report");
        }
        report.total
    };

    let (primary_keys, always_keep): (&[&str], Vec<&str>) = match find_stream(stream) {
        Some(def) => (def.primary_keys, def.key_properties().collect()),
        None => (&[], Vec::new()),
    };
    let replication: Vec<&str> = find_stream(stream)
        .and_then(|d| d.replication_key)
        .into_iter()
        .collect();

    writer.write(&SingerMessage::schema(
        stream,
        schema.document().clone(),
        primary_keys,
        &replication,
    ))?;
    let mut stats = StreamStats::new(stream);
    emit_results(
        writer,
        stream,
        &always_keep,
        &Selection::all().for_stream(stream),
        results,
        &mut stats,
    )?;
    writer.flush()?;

    stats.rejected += input.unparsable.len();
    info!(
        stream,
        total,
        emitted = stats.emitted,
        rejected = stats.rejected,
        warnings = stats.warnings,
        "Validation complete"
    );

    Ok(stats)
}

/// Resolve `--streams` into stream definitions, in catalog order
fn resolve_streams(streams: Option<&str>) -> Result<Vec<&'static StreamDefinition>> {
    let Some(list) = streams.filter(|s| !s.trim().is_empty()) else {
        return Ok(STREAMS.iter().collect());
    };

    let names: Vec<&str> = list.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
    for name in &names {
        if find_stream(name).is_none() {
            return Err(Error::unknown_stream(*name));
        }
    }
    Ok(STREAMS
        .iter()
        .filter(|def| names.contains(&def.name))
        .collect())
}

/// Parsed NDJSON input
struct NdjsonInput {
    /// Parsed records
    records: Vec<Value>,
    /// 1-based line number of each parsed record
    lines: Vec<usize>,
    /// Lines that failed to parse, with the parse error
    unparsable: Vec<(usize, String)>,
}

fn read_ndjson(reader: impl Read) -> Result<NdjsonInput> {
    let mut input = NdjsonInput {
        records: Vec::new(),
        lines: Vec::new(),
        unparsable: Vec::new(),
    };

    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(&line) {
            Ok(value) => {
                input.records.push(value);
                input.lines.push(line_no);
            }
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping unparsable line");
                input.unparsable.push((line_no, e.to_string()));
            }
        }
    }

    Ok(input)
}

/// Per-record validation report
#[derive(Debug, Serialize)]
struct ValidationReport<'a> {
    stream: &'a str,
    total: usize,
    valid: usize,
    rejected: usize,
    warnings: usize,
    records: Vec<RecordReport<'a>>,
}

#[derive(Debug, Serialize)]
struct RecordReport<'a> {
    line: usize,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_error: Option<&'a str>,
    errors: &'a [FieldIssue],
    warnings: &'a [FieldIssue],
}

impl<'a> ValidationReport<'a> {
    fn new(
        stream: &'a str,
        lines: &[usize],
        unparsable: &'a [(usize, String)],
        results: &'a [ValidationResult],
    ) -> Self {
        let mut records: Vec<RecordReport<'a>> = lines
            .iter()
            .zip(results)
            .map(|(&line, result)| RecordReport {
                line,
                valid: result.is_valid(),
                parse_error: None,
                errors: &result.errors,
                warnings: &result.warnings,
            })
            .collect();
        records.extend(unparsable.iter().map(|(line, error)| RecordReport {
            line: *line,
            valid: false,
            parse_error: Some(error.as_str()),
            errors: &[],
            warnings: &[],
        }));
        records.sort_by_key(|r| r.line);

        let valid = records.iter().filter(|r| r.valid).count();
        Self {
            stream,
            total: records.len(),
            valid,
            rejected: records.len() - valid,
            warnings: results.iter().map(|r| r.warnings.len()).sum(),
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_value;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_streams_default_is_all() {
        assert_eq!(resolve_streams(None).unwrap().len(), STREAMS.len());
        assert_eq!(resolve_streams(Some(" ")).unwrap().len(), STREAMS.len());
    }

    #[test]
    fn test_resolve_streams_keeps_catalog_order() {
        let streams = resolve_streams(Some("ads, campaigns")).unwrap();
        let names: Vec<_> = streams.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["campaigns", "ads"]);
    }

    #[test]
    fn test_resolve_streams_unknown() {
        let err = resolve_streams(Some("campaigns,portfolios")).unwrap_err();
        assert!(matches!(err, Error::UnknownStream { stream } if stream == "portfolios"));
    }

    #[test]
    fn test_read_ndjson() {
        let text = "{\"campaignId\":\"1\"}\n\nnot json\n{\"campaignId\":\"2\"}\n";
        let input = read_ndjson(text.as_bytes()).unwrap();
        assert_eq!(input.records.len(), 2);
        assert_eq!(input.lines, vec![1, 4]);
        assert_eq!(input.unparsable.len(), 1);
        assert_eq!(input.unparsable[0].0, 3);
    }

    #[test]
    fn test_validation_report() {
        let registry = SchemaRegistry::builtin().unwrap();
        let schema = registry.get_schema("search_term_reports").unwrap();
        let text = concat!(
            "{\"campaignId\":\"123\",\"date\":\"2024-02-09\",\"cost\":10.5}\n",
            "{\"campaignId\":\"124\"}\n",
            "{oops\n",
        );
        let input = read_ndjson(text.as_bytes()).unwrap();
        let results: Vec<_> = input
            .records
            .iter()
            .map(|r| validate_value(schema, r))
            .collect();

        let report =
            ValidationReport::new("search_term_reports", &input.lines, &input.unparsable, &results);
        assert_eq!(report.total, 3);
        assert_eq!(report.valid, 1);
        assert_eq!(report.rejected, 2);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["records"][0]["valid"], true);
        assert_eq!(json["records"][1]["errors"][0]["code"], "missing_required_field");
        assert_eq!(json["records"][1]["errors"][0]["path"], "date");
        assert!(json["records"][2]["parse_error"].is_string());
    }

    #[tokio::test]
    async fn test_validate_input_emits_and_writes_report() {
        let schema = SchemaRegistry::shared()
            .unwrap()
            .get_shared("search_term_reports")
            .unwrap();
        let text = concat!(
            "{\"campaignId\":\"123\",\"date\":\"20240209\",\"cost\":\"10.5\"}\n",
            "{\"campaignId\":\"124\"}\n",
            "{oops\n",
        );
        let input = read_ndjson(text.as_bytes()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("report.json");

        let mut writer = MessageWriter::new(Vec::new());
        let stats = validate_input(
            "search_term_reports",
            schema,
            input,
            &mut writer,
            Some(&report_path),
        )
        .await
        .unwrap();
        assert_eq!(stats.emitted, 1);
        assert_eq!(stats.rejected, 2);

        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let messages: Vec<Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["type"], "SCHEMA");
        assert_eq!(messages[1]["record"]["date"], "2024-02-09");
        assert_eq!(messages[1]["record"]["cost"], json!(10.5));

        let report: Value =
            serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(report["total"], 3);
        assert_eq!(report["valid"], 1);
        assert_eq!(report["rejected"], 2);
    }
}
