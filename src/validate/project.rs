//! Nested-object projection
//!
//! Walks a raw value alongside its [`FieldSpec`], coercing leaves and
//! recursing into declared objects and arrays. Issues are collected, never
//! raised: a bad array element or nested field is recorded and the walk
//! carries on with its siblings.

use super::coerce::coerce;
use super::types::{FieldError, FieldIssue, FieldPath, NormalizedValue, Severity};
use crate::schema::{FieldKind, FieldSpec, ObjectSpec};
use crate::types::{JsonObject, JsonValue};
use std::collections::BTreeMap;

/// Issues found during one projection, split by severity
#[derive(Debug, Default)]
pub(crate) struct IssueLog {
    pub warnings: Vec<FieldIssue>,
    pub errors: Vec<FieldIssue>,
}

impl IssueLog {
    /// Record an issue. `required` says whether every step of `path` is
    /// required; only those issues reject the record.
    fn push(&mut self, path: FieldPath, required: bool, error: FieldError) {
        let severity = if required && error != FieldError::UnknownField {
            Severity::Error
        } else {
            Severity::Warning
        };
        let issue = FieldIssue {
            path,
            error,
            severity,
        };
        match severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }

    /// Every issue, errors first
    pub fn into_issues(self) -> Vec<FieldIssue> {
        let mut issues = self.errors;
        issues.extend(self.warnings);
        issues
    }
}

/// Project one raw value through `spec`.
///
/// The value is treated as optional; paths in the returned issues are
/// relative to it.
pub fn project(spec: &FieldSpec, raw: &JsonValue) -> (NormalizedValue, Vec<FieldIssue>) {
    let mut log = IssueLog::default();
    let value = project_value(spec, raw, &FieldPath::root(), false, &mut log);
    (value, log.into_issues())
}

pub(crate) fn project_value(
    spec: &FieldSpec,
    raw: &JsonValue,
    path: &FieldPath,
    required: bool,
    log: &mut IssueLog,
) -> NormalizedValue {
    match (&spec.kind, raw) {
        (FieldKind::ObjectOf(object), JsonValue::Object(map)) => {
            NormalizedValue::Object(project_object(object, map, path, required, log))
        }
        (FieldKind::ArrayOf(items), JsonValue::Array(elements)) => NormalizedValue::Array(
            elements
                .iter()
                .enumerate()
                .map(|(i, element)| project_value(items, element, &path.index(i), false, log))
                .collect(),
        ),
        _ => match coerce(spec, Some(raw)) {
            Ok(value) => value,
            Err(error) => {
                log.push(path.clone(), required, error);
                NormalizedValue::from(raw)
            }
        },
    }
}

pub(crate) fn project_object(
    object: &ObjectSpec,
    map: &JsonObject,
    path: &FieldPath,
    required: bool,
    log: &mut IssueLog,
) -> BTreeMap<String, NormalizedValue> {
    let mut out = BTreeMap::new();

    for (name, spec) in &object.properties {
        let child_path = path.key(name);
        let is_required = object.is_required(name);
        let raw = map.get(name);

        if is_required && raw.map_or(true, JsonValue::is_null) {
            log.push(
                child_path,
                required,
                FieldError::MissingRequiredField,
            );
            if raw.is_some() {
                out.insert(name.clone(), NormalizedValue::Null);
            }
            continue;
        }

        match raw {
            Some(value) => {
                let child_required = required && is_required;
                let normalized = project_value(spec, value, &child_path, child_required, log);
                out.insert(name.clone(), normalized);
            }
            None if spec.is_nullable() => {
                out.insert(name.clone(), NormalizedValue::Null);
            }
            None => {}
        }
    }

    for (name, value) in map {
        if !object.properties.contains_key(name) {
            log.push(path.key(name), false, FieldError::UnknownField);
            out.insert(name.clone(), NormalizedValue::from(value));
        }
    }

    out
}
