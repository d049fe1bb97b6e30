//! Singer message types

use crate::types::JsonValue;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// One line of Singer output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum SingerMessage {
    /// Stream schema, sent once before the stream's records
    Schema {
        /// Stream name
        stream: String,
        /// JSON Schema document with references inlined
        schema: JsonValue,
        /// Primary key properties
        key_properties: Vec<String>,
        /// Replication key, if any
        bookmark_properties: Vec<String>,
    },
    /// One accepted record
    Record {
        /// Stream name
        stream: String,
        /// Normalized record
        record: JsonValue,
        /// Extraction time
        #[serde(serialize_with = "serialize_extracted")]
        time_extracted: DateTime<Utc>,
    },
}

impl SingerMessage {
    /// Build a SCHEMA message
    pub fn schema(
        stream: impl Into<String>,
        schema: JsonValue,
        key_properties: &[&str],
        bookmark_properties: &[&str],
    ) -> Self {
        Self::Schema {
            stream: stream.into(),
            schema,
            key_properties: key_properties.iter().map(ToString::to_string).collect(),
            bookmark_properties: bookmark_properties
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Build a RECORD message
    pub fn record(
        stream: impl Into<String>,
        record: JsonValue,
        time_extracted: DateTime<Utc>,
    ) -> Self {
        Self::Record {
            stream: stream.into(),
            record,
            time_extracted,
        }
    }

    /// Stream the message belongs to
    pub fn stream(&self) -> &str {
        match self {
            Self::Schema { stream, .. } | Self::Record { stream, .. } => stream,
        }
    }
}

fn serialize_extracted<S: Serializer>(
    value: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Micros, true))
}
