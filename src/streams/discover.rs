//! Singer catalog discovery

use super::catalog::{StreamDefinition, STREAMS};
use super::selection::Selection;
use crate::error::Result;
use crate::schema::SchemaRegistry;
use crate::types::JsonValue;
use serde::Serialize;
use serde_json::json;

/// One catalog entry
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    /// Stream identifier
    pub tap_stream_id: String,
    /// Stream name
    pub stream: String,
    /// Schema document with references inlined
    pub schema: JsonValue,
    /// Primary key properties
    pub key_properties: Vec<String>,
    /// Replication key, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,
    /// Replication method
    pub replication_method: &'static str,
    /// Singer metadata
    pub metadata: Vec<JsonValue>,
}

/// Singer catalog
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    /// Catalog entries, in sync order
    pub streams: Vec<CatalogEntry>,
}

impl Catalog {
    /// Build the catalog of all syncable streams
    pub fn discover(registry: &SchemaRegistry, selection: &Selection) -> Result<Self> {
        let streams = STREAMS
            .iter()
            .map(|def| catalog_entry(registry, def, selection.is_selected(def.name)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { streams })
    }

    /// Find an entry by stream name
    pub fn get(&self, stream: &str) -> Option<&CatalogEntry> {
        self.streams.iter().find(|e| e.stream == stream)
    }
}

fn catalog_entry(
    registry: &SchemaRegistry,
    def: &StreamDefinition,
    selected: bool,
) -> Result<CatalogEntry> {
    let schema = registry.get_schema(def.name)?;

    let mut metadata = vec![json!({
        "breadcrumb": [],
        "metadata": {
            "selected": selected,
            "inclusion": "available",
            "table-key-properties": def.primary_keys,
            "valid-replication-keys": def.replication_key.into_iter().collect::<Vec<_>>(),
        }
    })];

    for name in schema.properties().keys() {
        let automatic = def.key_properties().any(|k| k == name);
        metadata.push(json!({
            "breadcrumb": ["properties", name],
            "metadata": {
                "inclusion": if automatic { "automatic" } else { "available" },
            }
        }));
    }

    Ok(CatalogEntry {
        tap_stream_id: def.name.to_string(),
        stream: def.name.to_string(),
        schema: schema.document().clone(),
        key_properties: def.primary_keys.iter().map(ToString::to_string).collect(),
        replication_key: def.replication_key.map(ToString::to_string),
        replication_method: if def.replication_key.is_some() {
            "INCREMENTAL"
        } else {
            "FULL_TABLE"
        },
        metadata,
    })
}
