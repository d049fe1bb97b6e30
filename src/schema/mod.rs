//! Schema registry module
//!
//! Loads the per-stream JSON Schema documents into an immutable tree of
//! [`StreamSchema`] / [`FieldSpec`] values.
//!
//! # Features
//!
//! - **Embedded Schemas**: The nine stream schemas ship inside the binary
//! - **Shared Vocabularies**: Enums such as currency codes are defined once
//!   and referenced with `$ref`
//! - **Strict Parsing**: Malformed schemas fail at startup, never per record

mod builtin;
mod parser;
mod registry;
mod types;

pub use builtin::BUILTIN_SCHEMAS;
pub use parser::{parse_stream_schema, Definitions};
pub use registry::SchemaRegistry;
pub use types::{
    FieldKind, FieldSpec, Format, JsonType, ObjectSpec, StreamSchema, TypeSet, Vocabulary,
};

#[cfg(test)]
mod tests;
