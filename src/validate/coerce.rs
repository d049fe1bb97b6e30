//! Type coercion
//!
//! Maps one wire value onto the canonical form its [`FieldSpec`] declares.
//! Coercion is pure: the same spec and value always give the same result,
//! and coercing an already-normalized value is a no-op.

use super::types::{FieldError, NormalizedValue};
use crate::schema::{FieldKind, FieldSpec, Format, JsonType, TypeSet};
use crate::types::JsonValue;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde_json::Number;

/// Coerce a raw value to the canonical form for `spec`.
///
/// `None` means the field is absent. Absent or null values become
/// [`NormalizedValue::Null`] when the field is nullable.
///
/// Container specs only get a shape check here; recursing into their
/// contents is the projector's job.
pub fn coerce(spec: &FieldSpec, raw: Option<&JsonValue>) -> Result<NormalizedValue, FieldError> {
    let value = match raw {
        None if spec.is_nullable() => return Ok(NormalizedValue::Null),
        None => return Err(FieldError::MissingRequiredField),
        Some(value) => value,
    };

    if value.is_null() {
        return if spec.is_nullable() {
            Ok(NormalizedValue::Null)
        } else {
            Err(FieldError::type_mismatch(spec.types, value))
        };
    }

    match &spec.kind {
        FieldKind::Enum(vocabulary) => match value {
            JsonValue::String(s) if vocabulary.contains(s) => Ok(NormalizedValue::String(s.clone())),
            JsonValue::String(s) => Err(FieldError::InvalidEnumValue {
                value: s.clone(),
                vocabulary: vocabulary.name().map(String::from),
            }),
            other => Err(FieldError::type_mismatch(spec.types, other)),
        },
        FieldKind::Scalar {
            format: Some(format),
        } => coerce_formatted(spec.types, *format, value),
        FieldKind::Scalar { format: None } => coerce_plain(spec.types, value),
        FieldKind::ArrayOf(_) | FieldKind::ObjectOf(_) => {
            if spec.types.accepts(value) {
                Ok(NormalizedValue::from(value))
            } else {
                Err(FieldError::type_mismatch(spec.types, value))
            }
        }
    }
}

fn coerce_plain(types: TypeSet, value: &JsonValue) -> Result<NormalizedValue, FieldError> {
    if types.accepts(value) {
        return Ok(NormalizedValue::from(value));
    }

    match value {
        JsonValue::String(s) if types.contains(JsonType::Integer) || types.contains(JsonType::Number) => {
            parse_number(types, s)
                .map(NormalizedValue::Number)
                .ok_or_else(|| FieldError::type_mismatch(types, value))
        }
        JsonValue::String(s) if types.contains(JsonType::Boolean) => parse_bool_str(s)
            .map(NormalizedValue::Bool)
            .ok_or_else(|| FieldError::type_mismatch(types, value)),
        JsonValue::Number(n) if types.contains(JsonType::Boolean) => match n.as_u64() {
            Some(0) => Ok(NormalizedValue::Bool(false)),
            Some(1) => Ok(NormalizedValue::Bool(true)),
            _ => Err(FieldError::type_mismatch(types, value)),
        },
        // Numeric ids arrive as numbers on some ad products
        JsonValue::Number(n) if types.contains(JsonType::String) => {
            Ok(NormalizedValue::String(n.to_string()))
        }
        other => Err(FieldError::type_mismatch(types, other)),
    }
}

fn coerce_formatted(
    types: TypeSet,
    format: Format,
    value: &JsonValue,
) -> Result<NormalizedValue, FieldError> {
    let invalid = |text: String| FieldError::InvalidFormat {
        format,
        value: text,
    };

    match (format, value) {
        (Format::Date, JsonValue::String(s)) => parse_date(s)
            .map(NormalizedValue::Date)
            .ok_or_else(|| invalid(s.clone())),
        (Format::Date, JsonValue::Number(n)) if n.is_u64() => {
            let text = n.to_string();
            parse_date(&text)
                .map(NormalizedValue::Date)
                .ok_or_else(|| invalid(text))
        }
        (Format::DateTime, JsonValue::String(s)) => parse_date_time(s)
            .map(NormalizedValue::DateTime)
            .ok_or_else(|| invalid(s.clone())),
        (Format::DateTime, JsonValue::Number(n)) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .and_then(four_digit_year)
            .map(NormalizedValue::DateTime)
            .ok_or_else(|| invalid(n.to_string())),
        (_, other) => Err(FieldError::type_mismatch(types, other)),
    }
}

/// Parse a numeric-looking string. Integers are preferred; a string like
/// `"42.0"` satisfies an integer-only field.
fn parse_number(types: TypeSet, text: &str) -> Option<Number> {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = text.parse::<u64>() {
        return Some(Number::from(u));
    }

    let f = text.parse::<f64>().ok().filter(|f| f.is_finite())?;
    if types.contains(JsonType::Number) {
        return Number::from_f64(f);
    }
    if f.fract() != 0.0 {
        return None;
    }
    // i64::MAX and u64::MAX round up to 2^63 and 2^64 as f64
    if f >= i64::MIN as f64 && f < i64::MAX as f64 {
        return Some(Number::from(f as i64));
    }
    if f >= 0.0 && f < u64::MAX as f64 {
        return Some(Number::from(f as u64));
    }
    None
}

fn parse_bool_str(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") || text == "1" {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") || text == "0" {
        Some(false)
    } else {
        None
    }
}

/// `YYYY-MM-DD`, or the compact `YYYYMMDD` used by report payloads
pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let date = if text.len() == 8 && text.bytes().all(|b| b.is_ascii_digit()) {
        NaiveDate::parse_from_str(text, "%Y%m%d").ok()
    } else {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
    };
    date.and_then(four_digit_year)
}

/// RFC 3339 with any offset, or a naive timestamp taken as UTC
pub(crate) fn parse_date_time(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    let parsed = match DateTime::parse_from_rfc3339(text) {
        Ok(t) => Some(t.with_timezone(&Utc)),
        Err(_) => ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
            .map(|naive| naive.and_utc()),
    };
    parsed.and_then(four_digit_year)
}

/// Years outside `0000..=9999` have no RFC 3339 / ISO 8601 basic form and
/// would not parse back after serialization.
fn four_digit_year<T: Datelike>(value: T) -> Option<T> {
    (0..=9999).contains(&value.year()).then_some(value)
}
