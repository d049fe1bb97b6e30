//! Record validator

use super::project::{project_object, IssueLog};
use super::types::{FieldError, FieldIssue, FieldPath, Severity, ValidationResult};
use crate::error::Result;
use crate::schema::{JsonType, SchemaRegistry, StreamSchema, TypeSet};
use crate::types::{JsonObject, JsonValue};
use std::sync::Arc;

/// Validate and normalize one record against a stream schema
pub fn validate(schema: &StreamSchema, record: &JsonObject) -> ValidationResult {
    let mut log = IssueLog::default();
    let normalized = project_object(schema.object(), record, &FieldPath::root(), true, &mut log);

    ValidationResult {
        record: normalized,
        warnings: log.warnings,
        errors: log.errors,
    }
}

/// Validate a record that may not be a JSON object.
///
/// Anything but an object is rejected with a root-level type mismatch.
pub fn validate_value(schema: &StreamSchema, record: &JsonValue) -> ValidationResult {
    match record {
        JsonValue::Object(map) => validate(schema, map),
        other => ValidationResult {
            errors: vec![FieldIssue {
                path: FieldPath::root(),
                error: FieldError::type_mismatch(TypeSet::single(JsonType::Object), other),
                severity: Severity::Error,
            }],
            ..ValidationResult::default()
        },
    }
}

/// Validate a record for a stream looked up in a registry
pub fn validate_record(
    registry: &SchemaRegistry,
    stream: &str,
    record: &JsonObject,
) -> Result<ValidationResult> {
    let schema = registry.get_schema(stream)?;
    Ok(validate(schema, record))
}

/// Validator bound to one stream's schema.
///
/// Cheap to clone; clones share the schema.
#[derive(Debug, Clone)]
pub struct RecordValidator {
    schema: Arc<StreamSchema>,
}

impl RecordValidator {
    /// Create a validator for a schema
    pub fn new(schema: Arc<StreamSchema>) -> Self {
        Self { schema }
    }

    /// Create a validator for a registered stream
    pub fn for_stream(registry: &SchemaRegistry, stream: &str) -> Result<Self> {
        registry.get_shared(stream).map(Self::new)
    }

    /// Stream name
    pub fn stream(&self) -> &str {
        self.schema.name()
    }

    /// The bound schema
    pub fn schema(&self) -> &Arc<StreamSchema> {
        &self.schema
    }

    /// Validate one record
    pub fn validate(&self, record: &JsonValue) -> ValidationResult {
        validate_value(&self.schema, record)
    }

    /// Validate records in order
    pub fn validate_all(&self, records: &[JsonValue]) -> Vec<ValidationResult> {
        records.iter().map(|r| self.validate(r)).collect()
    }
}
