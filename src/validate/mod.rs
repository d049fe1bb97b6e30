//! Record validation module
//!
//! Validates raw API records against their stream schema and normalizes
//! them for emission.
//!
//! # Features
//!
//! - **Required Fields**: Missing or null required fields reject the record
//! - **Enum Vocabularies**: Values outside a declared vocabulary are flagged
//! - **Coercion**: Numeric strings, boolean-looking values, dates and
//!   timestamps are converted to their declared type
//! - **Nested Projection**: Objects and arrays are validated to any depth,
//!   with per-element partial failure
//!
//! # Severity
//!
//! A field is required when every step of its path is required by its
//! parent. Array elements are never required. Issues on required fields
//! are errors and reject the record; every other issue is a warning and
//! the value passes through as received.
//!
//! # Example
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

mod coerce;
mod project;
mod types;
mod validator;

pub use coerce::coerce;
pub use project::project;
pub use types::{
    FieldError, FieldIssue, FieldPath, NormalizedValue, PathSegment, Severity, ValidationResult,
};
pub use validator::{validate, validate_record, validate_value, RecordValidator};

pub(crate) use coerce::{parse_date, parse_date_time};

#[cfg(test)]
mod tests;
