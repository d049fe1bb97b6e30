//! Validation types
//!
//! Normalized values, field paths, per-field issues and the result of
//! validating one record.

use crate::schema::{Format, JsonType, TypeSet};
use crate::types::JsonValue;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::Number;
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Normalized values
// ============================================================================

/// Canonical in-memory form of a record value.
///
/// Dates and timestamps are parsed; everything else mirrors JSON.
/// Numbers keep `serde_json`'s lossless representation.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Calendar date, serialized as `YYYY-MM-DD`
    Date(NaiveDate),
    /// UTC instant, serialized as RFC 3339 with a `Z` suffix
    DateTime(DateTime<Utc>),
    Array(Vec<NormalizedValue>),
    Object(BTreeMap<String, NormalizedValue>),
}

impl NormalizedValue {
    /// Check if this is the null marker
    pub fn is_null(&self) -> bool {
        matches!(self, NormalizedValue::Null)
    }

    /// Get a nested object field
    pub fn get(&self, key: &str) -> Option<&NormalizedValue> {
        match self {
            NormalizedValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Get as string slice, for string values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NormalizedValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert back to a JSON value
    pub fn to_json(&self) -> JsonValue {
        match self {
            NormalizedValue::Null => JsonValue::Null,
            NormalizedValue::Bool(b) => JsonValue::Bool(*b),
            NormalizedValue::Number(n) => JsonValue::Number(n.clone()),
            NormalizedValue::String(s) => JsonValue::String(s.clone()),
            NormalizedValue::Date(d) => JsonValue::String(format_date(*d)),
            NormalizedValue::DateTime(t) => JsonValue::String(format_date_time(*t)),
            NormalizedValue::Array(items) => {
                JsonValue::Array(items.iter().map(NormalizedValue::to_json).collect())
            }
            NormalizedValue::Object(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Pass a raw value through unchanged
impl From<&JsonValue> for NormalizedValue {
    fn from(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => NormalizedValue::Null,
            JsonValue::Bool(b) => NormalizedValue::Bool(*b),
            JsonValue::Number(n) => NormalizedValue::Number(n.clone()),
            JsonValue::String(s) => NormalizedValue::String(s.clone()),
            JsonValue::Array(items) => {
                NormalizedValue::Array(items.iter().map(NormalizedValue::from).collect())
            }
            JsonValue::Object(map) => NormalizedValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), NormalizedValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for NormalizedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NormalizedValue::Null => serializer.serialize_unit(),
            NormalizedValue::Bool(b) => serializer.serialize_bool(*b),
            NormalizedValue::Number(n) => n.serialize(serializer),
            NormalizedValue::String(s) => serializer.serialize_str(s),
            NormalizedValue::Date(d) => serializer.serialize_str(&format_date(*d)),
            NormalizedValue::DateTime(t) => serializer.serialize_str(&format_date_time(*t)),
            NormalizedValue::Array(items) => items.serialize(serializer),
            NormalizedValue::Object(map) => map.serialize(serializer),
        }
    }
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn format_date_time(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

// ============================================================================
// Field paths
// ============================================================================

/// One step of a field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object property
    Key(String),
    /// Array element
    Index(usize),
}

/// Location of a value inside a record, e.g. `creative.cards[2].landingPage`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The record root
    pub fn root() -> Self {
        Self::default()
    }

    /// Path segments from the root
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Child path for an object property
    #[must_use]
    pub fn key(&self, name: &str) -> Self {
        let mut path = self.clone();
        path.0.push(PathSegment::Key(name.to_string()));
        path
    }

    /// Child path for an array element
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.0.push(PathSegment::Index(index));
        path
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<record>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// Field errors
// ============================================================================

/// What is wrong with one field
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("required field is missing or null")]
    MissingRequiredField,

    #[error("'{value}' is not a member of {}", .vocabulary.as_deref().unwrap_or("the declared enum"))]
    InvalidEnumValue {
        value: String,
        vocabulary: Option<String>,
    },

    #[error("'{value}' is not a valid {format}")]
    InvalidFormat { format: Format, value: String },

    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: TypeSet, found: JsonType },

    #[error("field is not declared in the schema")]
    UnknownField,
}

impl FieldError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            FieldError::MissingRequiredField => "missing_required_field",
            FieldError::InvalidEnumValue { .. } => "invalid_enum_value",
            FieldError::InvalidFormat { .. } => "invalid_format",
            FieldError::TypeMismatch { .. } => "type_mismatch",
            FieldError::UnknownField => "unknown_field",
        }
    }

    pub(crate) fn type_mismatch(expected: TypeSet, found: &JsonValue) -> Self {
        FieldError::TypeMismatch {
            expected,
            found: JsonType::of(found),
        }
    }
}

/// Whether an issue rejects the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Recorded; the value passes through as received
    Warning,
    /// The record is rejected
    Error,
}

/// A field error at a location, with its severity
#[derive(Debug, Clone, PartialEq)]
pub struct FieldIssue {
    pub path: FieldPath,
    pub error: FieldError,
    pub severity: Severity,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.error)
    }
}

impl Serialize for FieldIssue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Report<'a> {
            path: &'a FieldPath,
            severity: Severity,
            code: &'static str,
            message: String,
        }

        Report {
            path: &self.path,
            severity: self.severity,
            code: self.error.code(),
            message: self.error.to_string(),
        }
        .serialize(serializer)
    }
}

// ============================================================================
// Validation result
// ============================================================================

/// Normalized record plus everything found while producing it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    /// Normalized record. Present even when the record is rejected.
    pub record: BTreeMap<String, NormalizedValue>,
    /// Issues that did not reject the record, in discovery order
    pub warnings: Vec<FieldIssue>,
    /// Issues that reject the record, in discovery order
    pub errors: Vec<FieldIssue>,
}

impl ValidationResult {
    /// Check if the record may be emitted
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// All issues, errors first
    pub fn issues(&self) -> impl Iterator<Item = &FieldIssue> {
        self.errors.iter().chain(self.warnings.iter())
    }

    /// Normalized record as a JSON object
    pub fn record_json(&self) -> JsonValue {
        JsonValue::Object(
            self.record
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    /// The normalized record, if it was accepted
    pub fn into_record(self) -> Option<BTreeMap<String, NormalizedValue>> {
        self.is_valid().then_some(self.record)
    }
}
