//! Decoder implementations

use super::types::Compression;
use crate::error::{Error, Result};
use flate2::read::GzDecoder;
use serde_json::Value;
use std::io::Read;

/// Decompress a body according to its detected encoding
pub fn decompress(body: &[u8], content_encoding: Option<&str>) -> Result<Vec<u8>> {
    match Compression::detect(content_encoding, body) {
        Compression::Identity => Ok(body.to_vec()),
        Compression::Gzip => {
            // Header says gzip but the client already inflated it
            if !body.starts_with(&Compression::GZIP_MAGIC) {
                return Ok(body.to_vec());
            }
            let mut out = Vec::with_capacity(body.len() * 4);
            GzDecoder::new(body)
                .read_to_end(&mut out)
                .map_err(|e| Error::decode(format!("Failed to decompress gzip body: {e}")))?;
            Ok(out)
        }
    }
}

// ============================================================================
// JSON Decoder
// ============================================================================

/// JSON decoder extracting a stream's records by path
#[derive(Debug, Clone)]
pub struct JsonDecoder {
    /// JSONPath or dot path to the record collection
    record_path: String,
}

impl JsonDecoder {
    /// Create a JSON decoder with a record path
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            record_path: path.into(),
        }
    }

    /// Inflate and parse a response body into the full JSON document
    pub fn parse(&self, body: &[u8], content_encoding: Option<&str>) -> Result<Value> {
        let body = decompress(body, content_encoding)?;
        serde_json::from_slice(&body).map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))
    }

    /// Extract records from an already parsed response
    pub fn extract_records(&self, value: &Value) -> Result<Vec<Value>> {
        let path = self.record_path.as_str();
        if path.contains('*') {
            return extract_with_jsonpath(value, path);
        }
        match extract_simple_path(value, path) {
            Some(Value::Array(arr)) => Ok(arr),
            Some(Value::Null) | None => Ok(vec![]),
            Some(v) => Ok(vec![v]),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Dot-notation path lookup (`$.a.b`, `items[0]`)
fn extract_simple_path(value: &Value, path: &str) -> Option<Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value.clone());
    }

    let mut current = value;
    for part in path.split('.') {
        if let Some(bracket_pos) = part.find('[') {
            let name = &part[..bracket_pos];
            let index_str = part[bracket_pos + 1..].trim_end_matches(']');

            if !name.is_empty() {
                current = current.get(name)?;
            }

            let index: usize = index_str.parse().ok()?;
            current = current.as_array()?.get(index)?;
        } else {
            current = current.get(part)?;
        }
    }

    Some(current.clone())
}

fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path)
        .map_err(|e| Error::json_path(format!("Invalid JSONPath '{path}': {e}")))?;

    match jp.find(value) {
        Value::Array(arr) => Ok(arr),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}
