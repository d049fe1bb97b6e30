//! Schema registry
//!
//! Indexes the parsed stream schemas by stream name. A registry is
//! immutable once built; the process-wide instance is published once and
//! then handed out by `Arc`.

use super::builtin::{BUILTIN_SCHEMAS, DEFINITIONS};
use super::parser::{parse_stream_schema, Definitions};
use super::types::{StreamSchema, Vocabulary};
use crate::error::{Error, Result};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

static SHARED: OnceCell<Arc<SchemaRegistry>> = OnceCell::new();

/// Read-only index of stream schemas
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Arc<StreamSchema>>,
    vocabularies: BTreeMap<String, Arc<Vocabulary>>,
}

impl SchemaRegistry {
    /// Parse the schemas embedded in the binary
    pub fn builtin() -> Result<Self> {
        Self::from_sources(DEFINITIONS, BUILTIN_SCHEMAS)
    }

    /// The process-wide registry, parsed on first use.
    ///
    /// A parse failure is returned to every caller; nothing is cached
    /// until parsing succeeds.
    pub fn shared() -> Result<Arc<Self>> {
        SHARED
            .get_or_try_init(|| Self::builtin().map(Arc::new))
            .cloned()
    }

    /// Build a registry from JSON source text
    pub fn from_sources(definitions: &str, schemas: &[(&str, &str)]) -> Result<Self> {
        let definitions: Value = serde_json::from_str(definitions)
            .map_err(|e| Error::schema("definitions", format!("invalid JSON: {e}")))?;

        let documents = schemas
            .iter()
            .map(|(name, source)| {
                serde_json::from_str::<Value>(source)
                    .map(|doc| ((*name).to_string(), doc))
                    .map_err(|e| Error::schema(*name, format!("invalid JSON: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_documents(&definitions, documents)
    }

    /// Build a registry from parsed documents
    pub fn from_documents(
        definitions: &Value,
        schemas: impl IntoIterator<Item = (String, Value)>,
    ) -> Result<Self> {
        let definitions = Definitions::parse(definitions)?;

        let vocabularies = definitions
            .iter()
            .filter_map(|(name, spec)| spec.vocabulary().map(|v| (name.clone(), Arc::clone(v))))
            .collect();

        let mut registry = Self {
            schemas: BTreeMap::new(),
            vocabularies,
        };

        for (name, document) in schemas {
            if registry.schemas.contains_key(&name) {
                return Err(Error::schema(&name, "duplicate stream schema"));
            }
            let schema = parse_stream_schema(&name, &document, &definitions)?;
            debug!(
                stream = %name,
                properties = schema.properties().len(),
                required = schema.required().len(),
                "Loaded stream schema"
            );
            registry.schemas.insert(name, Arc::new(schema));
        }

        Ok(registry)
    }

    /// Get the schema for a stream
    pub fn get_schema(&self, stream: &str) -> Result<&StreamSchema> {
        self.schemas
            .get(stream)
            .map(AsRef::as_ref)
            .ok_or_else(|| Error::unknown_stream(stream))
    }

    /// Get a shared handle to the schema for a stream
    pub fn get_shared(&self, stream: &str) -> Result<Arc<StreamSchema>> {
        self.schemas
            .get(stream)
            .cloned()
            .ok_or_else(|| Error::unknown_stream(stream))
    }

    /// Check if a stream has a schema
    pub fn contains(&self, stream: &str) -> bool {
        self.schemas.contains_key(stream)
    }

    /// Registered stream names, sorted
    pub fn stream_names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Get a shared vocabulary by definition name
    pub fn vocabulary(&self, name: &str) -> Option<&Arc<Vocabulary>> {
        self.vocabularies.get(name)
    }

    /// Number of registered schemas
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
