// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # tap-amazonads
//!
//! A Singer tap for the Amazon Ads API, built around a schema-driven
//! record validation and normalization layer.
//!
//! ## Features
//!
//! - **Schema Registry**: Per-stream JSON Schemas with shared enum
//!   vocabularies, loaded once and shared read-only
//! - **Validation**: Required fields, enum membership, date/date-time
//!   formats and JSON types, checked at every nesting level
//! - **Normalization**: Type coercion (numeric strings, epoch millis,
//!   compact dates) and null filling of absent optional fields
//! - **Partial Failure**: Unknown enum values and malformed optional fields
//!   become warnings; only issues on required fields reject a record
//! - **Extraction**: OAuth refresh-token auth, paged list endpoints, report
//!   creation, gzip payloads, Singer output
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tap_amazonads::schema::SchemaRegistry;
//! use tap_amazonads::validate::validate_record;
//!
//! let registry = SchemaRegistry::shared()?;
//! let record = serde_json::json!({"campaignId": "123", "date": "2024-02-09", "cost": 10.5});
//! let result = validate_record(&registry, "search_term_reports", record.as_object().unwrap())?;
//! assert!(result.is_valid());
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          CLI / Engine                           │
//! │   discover → Catalog    sync → Singer messages    validate      │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │   Paginate    │  Decode   │  Validate   │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Refresh  │ GET/POST  │ startIndex    │ gzip      │ Registry    │
//! │ token    │ Retry     │ nextToken     │ JSON      │ Coercion    │
//! │ Scope    │ Rate Limit│               │ JSONPath  │ Projection  │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types and type aliases
pub mod types;

/// Tap configuration
pub mod config;

/// Stream schemas and shared enum vocabularies
pub mod schema;

/// Record validation and normalization
pub mod validate;

/// Amazon Ads authentication
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Pagination strategies
pub mod pagination;

/// Response decoding
pub mod decode;

/// Stream catalog, selection and discovery
pub mod streams;

/// Singer output
pub mod output;

/// Main execution engine
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::TapConfig;
pub use schema::SchemaRegistry;
pub use validate::{validate_record, RecordValidator, ValidationResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
