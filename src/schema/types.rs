//! Schema types
//!
//! In-memory, immutable form of the per-stream JSON Schema documents.
//! A [`FieldSpec`] is a tagged union over the four shapes a property can
//! take, so validation code can match exhaustively instead of probing
//! optional keywords.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// JSON Schema primitive type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl JsonType {
    const ALL: [JsonType; 7] = [
        JsonType::String,
        JsonType::Number,
        JsonType::Integer,
        JsonType::Boolean,
        JsonType::Object,
        JsonType::Array,
        JsonType::Null,
    ];

    /// Parse a JSON Schema type name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(JsonType::String),
            "number" => Some(JsonType::Number),
            "integer" => Some(JsonType::Integer),
            "boolean" => Some(JsonType::Boolean),
            "object" => Some(JsonType::Object),
            "array" => Some(JsonType::Array),
            "null" => Some(JsonType::Null),
            _ => None,
        }
    }

    /// Kind of a JSON value. Integral numbers report `Integer`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => JsonType::Integer,
            Value::Number(_) => JsonType::Number,
            Value::String(_) => JsonType::String,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
        }
    }

    fn bit(self) -> u8 {
        match self {
            JsonType::String => 1,
            JsonType::Number => 1 << 1,
            JsonType::Integer => 1 << 2,
            JsonType::Boolean => 1 << 3,
            JsonType::Object => 1 << 4,
            JsonType::Array => 1 << 5,
            JsonType::Null => 1 << 6,
        }
    }
}

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonType::String => write!(f, "string"),
            JsonType::Number => write!(f, "number"),
            JsonType::Integer => write!(f, "integer"),
            JsonType::Boolean => write!(f, "boolean"),
            JsonType::Object => write!(f, "object"),
            JsonType::Array => write!(f, "array"),
            JsonType::Null => write!(f, "null"),
        }
    }
}

/// Set of allowed JSON types for a property (`"type": ["string", "null"]`)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeSet(u8);

impl TypeSet {
    /// The empty set
    pub const EMPTY: TypeSet = TypeSet(0);

    /// A set holding one type
    pub fn single(json_type: JsonType) -> Self {
        TypeSet(json_type.bit())
    }

    /// A set holding `json_type` and `null`
    pub fn nullable(json_type: JsonType) -> Self {
        Self::single(json_type).with(JsonType::Null)
    }

    /// Add a type to the set
    #[must_use]
    pub fn with(self, json_type: JsonType) -> Self {
        TypeSet(self.0 | json_type.bit())
    }

    /// Check if the set contains a type
    pub fn contains(self, json_type: JsonType) -> bool {
        self.0 & json_type.bit() != 0
    }

    /// Check if `null` is allowed
    pub fn is_nullable(self) -> bool {
        self.contains(JsonType::Null)
    }

    /// Check if the set is empty
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate types in declaration-independent canonical order
    pub fn iter(self) -> impl Iterator<Item = JsonType> {
        JsonType::ALL.into_iter().filter(move |t| self.contains(*t))
    }

    /// Check whether a value's kind is allowed as-is.
    ///
    /// An integral number satisfies `number`, and a number with a zero
    /// fractional part satisfies `integer`.
    pub fn accepts(self, value: &Value) -> bool {
        match value {
            Value::Number(n) => {
                self.contains(JsonType::Number)
                    || (self.contains(JsonType::Integer)
                        && (n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)))
            }
            other => self.contains(JsonType::of(other)),
        }
    }
}

impl FromIterator<JsonType> for TypeSet {
    fn from_iter<I: IntoIterator<Item = JsonType>>(iter: I) -> Self {
        iter.into_iter().fold(TypeSet::EMPTY, TypeSet::with)
    }
}

impl std::fmt::Display for TypeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.iter().map(|t| t.to_string()).collect();
        write!(f, "{}", names.join("|"))
    }
}

impl std::fmt::Debug for TypeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TypeSet({self})")
    }
}

/// Semantic string format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    /// ISO-8601 calendar date
    #[serde(rename = "date")]
    Date,
    /// ISO-8601 timestamp
    #[serde(rename = "date-time")]
    DateTime,
}

impl Format {
    /// Parse a JSON Schema format name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "date" => Some(Format::Date),
            "date-time" => Some(Format::DateTime),
            _ => None,
        }
    }

    /// JSON Schema format name
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Date => "date",
            Format::DateTime => "date-time",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of permitted string literals.
///
/// Named vocabularies come from the shared definitions document and are
/// shared (`Arc`) by every field that references them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    name: Option<String>,
    values: Vec<String>,
    lookup: HashSet<String>,
}

impl Vocabulary {
    /// Create a vocabulary
    pub fn new(name: Option<String>, values: Vec<String>) -> Self {
        let lookup = values.iter().cloned().collect();
        Self {
            name,
            values,
            lookup,
        }
    }

    /// Definition name, if this is a shared vocabulary
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Members in declaration order
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Check membership
    pub fn contains(&self, value: &str) -> bool {
        self.lookup.contains(value)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the vocabulary has no members
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Declared properties of an object, with its required list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSpec {
    /// Declared properties
    pub properties: BTreeMap<String, FieldSpec>,
    /// Required property names, in declaration order
    pub required: Vec<String>,
}

impl ObjectSpec {
    /// Get a declared property
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.properties.get(name)
    }

    /// Check if a property is required
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// Shape of a property
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Leaf value, optionally with a semantic format
    Scalar { format: Option<Format> },
    /// String drawn from a closed vocabulary
    Enum(Arc<Vocabulary>),
    /// Array whose elements follow one spec
    ArrayOf(Box<FieldSpec>),
    /// Object with declared nested properties
    ObjectOf(ObjectSpec),
}

/// One schema property
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Allowed JSON types
    pub types: TypeSet,
    /// Property shape
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Create a scalar spec
    pub fn scalar(types: TypeSet, format: Option<Format>) -> Self {
        Self {
            types,
            kind: FieldKind::Scalar { format },
        }
    }

    /// Check if `null` is allowed
    pub fn is_nullable(&self) -> bool {
        self.types.is_nullable()
    }

    /// Semantic format, for scalar specs
    pub fn format(&self) -> Option<Format> {
        match &self.kind {
            FieldKind::Scalar { format } => *format,
            _ => None,
        }
    }

    /// Enum vocabulary, for enum specs
    pub fn vocabulary(&self) -> Option<&Arc<Vocabulary>> {
        match &self.kind {
            FieldKind::Enum(vocabulary) => Some(vocabulary),
            _ => None,
        }
    }

    /// Element spec, for array specs
    pub fn items(&self) -> Option<&FieldSpec> {
        match &self.kind {
            FieldKind::ArrayOf(items) => Some(items),
            _ => None,
        }
    }

    /// Nested object spec, for object specs
    pub fn object(&self) -> Option<&ObjectSpec> {
        match &self.kind {
            FieldKind::ObjectOf(object) => Some(object),
            _ => None,
        }
    }
}

/// Parsed schema of one stream
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSchema {
    name: String,
    object: ObjectSpec,
    document: Value,
}

impl StreamSchema {
    /// Create a stream schema
    pub fn new(name: impl Into<String>, object: ObjectSpec, document: Value) -> Self {
        Self {
            name: name.into(),
            object,
            document,
        }
    }

    /// Stream name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-level object spec
    pub fn object(&self) -> &ObjectSpec {
        &self.object
    }

    /// Required top-level fields, in declaration order
    pub fn required(&self) -> &[String] {
        &self.object.required
    }

    /// Top-level properties
    pub fn properties(&self) -> &BTreeMap<String, FieldSpec> {
        &self.object.properties
    }

    /// Get a top-level property
    pub fn get_property(&self, name: &str) -> Option<&FieldSpec> {
        self.object.get(name)
    }

    /// Check if a top-level property is required
    pub fn is_required(&self, name: &str) -> bool {
        self.object.is_required(name)
    }

    /// Schema document with shared references inlined, as sent in
    /// Singer SCHEMA messages
    pub fn document(&self) -> &Value {
        &self.document
    }
}
