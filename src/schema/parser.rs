//! Schema document parsing
//!
//! Turns JSON Schema documents into [`StreamSchema`] trees. Parsing is
//! strict: anything the validator could not interpret (unknown type or
//! format names, dangling `$ref`s, required names without a property)
//! is rejected, since schemas are loaded once at startup.

use super::types::{
    FieldKind, FieldSpec, Format, JsonType, ObjectSpec, StreamSchema, TypeSet, Vocabulary,
};
use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

const REF_PREFIX: &str = "#/definitions/";

/// Shared definitions referenced by stream schemas through `$ref`
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    specs: BTreeMap<String, FieldSpec>,
    raw: Map<String, Value>,
}

impl Definitions {
    /// Parse a definitions document (`{"definitions": {...}}`)
    pub fn parse(document: &Value) -> Result<Self> {
        let raw = document
            .get("definitions")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| Error::schema("definitions", "missing 'definitions' object"))?;

        let empty = Definitions::default();
        let mut specs = BTreeMap::new();
        for (name, node) in &raw {
            let mut spec = parse_field(&empty, "definitions", name, node)?;
            // Name the vocabulary so every referencing field shares it
            if let FieldKind::Enum(vocabulary) = &spec.kind {
                spec.kind = FieldKind::Enum(Arc::new(Vocabulary::new(
                    Some(name.clone()),
                    vocabulary.values().to_vec(),
                )));
            }
            specs.insert(name.clone(), spec);
        }

        Ok(Self { specs, raw })
    }

    /// Get a parsed definition
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.specs.get(name)
    }

    /// Iterate definitions by name
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldSpec)> {
        self.specs.iter()
    }

    fn resolve(&self, stream: &str, reference: &Value) -> Result<(&FieldSpec, &Value)> {
        let name = reference
            .as_str()
            .and_then(|r| r.strip_prefix(REF_PREFIX))
            .ok_or_else(|| {
                Error::schema(stream, format!("unsupported $ref {reference}"))
            })?;
        match (self.specs.get(name), self.raw.get(name)) {
            (Some(spec), Some(raw)) => Ok((spec, raw)),
            _ => Err(Error::schema(
                stream,
                format!("unresolved $ref '{REF_PREFIX}{name}'"),
            )),
        }
    }
}

/// Parse a stream schema document
pub fn parse_stream_schema(
    name: &str,
    document: &Value,
    definitions: &Definitions,
) -> Result<StreamSchema> {
    let root = document
        .as_object()
        .ok_or_else(|| Error::schema(name, "schema document must be an object"))?;

    if let Some(t) = root.get("type") {
        let types = parse_types(name, "<root>", t)?;
        if !types.contains(JsonType::Object) {
            return Err(Error::schema(name, "top-level type must be 'object'"));
        }
    }

    if !root.contains_key("properties") {
        return Err(Error::schema(name, "missing 'properties'"));
    }

    let object = parse_object(definitions, name, "<root>", root)?;
    let inlined = inline_refs(name, document, definitions)?;

    Ok(StreamSchema::new(name, object, inlined))
}

fn parse_object(
    definitions: &Definitions,
    stream: &str,
    path: &str,
    node: &Map<String, Value>,
) -> Result<ObjectSpec> {
    let props = match node.get("properties") {
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(Error::schema(
                stream,
                format!("'{path}': 'properties' must be an object"),
            ))
        }
        None => return Ok(ObjectSpec::default()),
    };

    let mut properties = BTreeMap::new();
    for (key, child) in props {
        let child_path = if path == "<root>" {
            key.clone()
        } else {
            format!("{path}.{key}")
        };
        properties.insert(
            key.clone(),
            parse_field(definitions, stream, &child_path, child)?,
        );
    }

    let required = match node.get("required") {
        None => Vec::new(),
        Some(Value::Array(names)) => names
            .iter()
            .map(|n| {
                n.as_str().map(String::from).ok_or_else(|| {
                    Error::schema(stream, format!("'{path}': required entries must be strings"))
                })
            })
            .collect::<Result<Vec<_>>>()?,
        Some(_) => {
            return Err(Error::schema(
                stream,
                format!("'{path}': 'required' must be an array"),
            ))
        }
    };

    if let Some(missing) = required.iter().find(|r| !properties.contains_key(*r)) {
        return Err(Error::schema(
            stream,
            format!("'{path}': required field '{missing}' has no property definition"),
        ));
    }

    Ok(ObjectSpec {
        properties,
        required,
    })
}

fn parse_field(
    definitions: &Definitions,
    stream: &str,
    path: &str,
    node: &Value,
) -> Result<FieldSpec> {
    let obj = node
        .as_object()
        .ok_or_else(|| Error::schema(stream, format!("'{path}': property must be an object")))?;

    let base = match obj.get("$ref") {
        Some(reference) => Some(definitions.resolve(stream, reference)?.0),
        None => None,
    };

    let mut types = match (obj.get("type"), base) {
        (Some(t), _) => parse_types(stream, path, t)?,
        (None, Some(base)) => base.types,
        (None, None) => {
            return Err(Error::schema(stream, format!("'{path}': missing 'type'")))
        }
    };

    if let Some(values) = obj.get("enum") {
        let (vocabulary, has_null) = parse_enum(stream, path, values)?;
        if has_null {
            types = types.with(JsonType::Null);
        }
        return Ok(FieldSpec {
            types,
            kind: FieldKind::Enum(Arc::new(vocabulary)),
        });
    }

    if let Some(base) = base {
        return Ok(FieldSpec {
            types,
            kind: base.kind.clone(),
        });
    }

    if types.contains(JsonType::Object) && obj.contains_key("properties") {
        let object = parse_object(definitions, stream, path, obj)?;
        return Ok(FieldSpec {
            types,
            kind: FieldKind::ObjectOf(object),
        });
    }

    if types.contains(JsonType::Array) {
        if let Some(items) = obj.get("items") {
            let element = parse_field(definitions, stream, &format!("{path}[]"), items)?;
            return Ok(FieldSpec {
                types,
                kind: FieldKind::ArrayOf(Box::new(element)),
            });
        }
    }

    let format = match obj.get("format") {
        None => None,
        Some(Value::String(name)) => Some(Format::parse(name).ok_or_else(|| {
            Error::schema(stream, format!("'{path}': unsupported format '{name}'"))
        })?),
        Some(other) => {
            return Err(Error::schema(
                stream,
                format!("'{path}': format must be a string, got {other}"),
            ))
        }
    };

    Ok(FieldSpec::scalar(types, format))
}

fn parse_types(stream: &str, path: &str, node: &Value) -> Result<TypeSet> {
    let parse_one = |v: &Value| -> Result<JsonType> {
        v.as_str()
            .and_then(JsonType::parse)
            .ok_or_else(|| Error::schema(stream, format!("'{path}': unknown type {v}")))
    };

    let types: TypeSet = match node {
        Value::Array(list) => list.iter().map(parse_one).collect::<Result<_>>()?,
        single => TypeSet::single(parse_one(single)?),
    };

    if types.is_empty() {
        return Err(Error::schema(stream, format!("'{path}': empty type list")));
    }
    Ok(types)
}

fn parse_enum(stream: &str, path: &str, node: &Value) -> Result<(Vocabulary, bool)> {
    let list = node
        .as_array()
        .ok_or_else(|| Error::schema(stream, format!("'{path}': enum must be an array")))?;

    let mut has_null = false;
    let mut values = Vec::with_capacity(list.len());
    for v in list {
        match v {
            Value::String(s) => values.push(s.clone()),
            Value::Null => has_null = true,
            other => {
                return Err(Error::schema(
                    stream,
                    format!("'{path}': enum literal {other} is not a string"),
                ))
            }
        }
    }

    Ok((Vocabulary::new(None, values), has_null))
}

/// Replace `$ref` nodes with the referenced definition so the emitted
/// SCHEMA message is self-contained. Sibling keywords win over the
/// definition's.
fn inline_refs(stream: &str, node: &Value, definitions: &Definitions) -> Result<Value> {
    match node {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, value) in map {
                if key == "$ref" {
                    continue;
                }
                out.insert(key.clone(), inline_refs(stream, value, definitions)?);
            }
            if let Some(reference) = map.get("$ref") {
                let (_, raw) = definitions.resolve(stream, reference)?;
                if let Value::Object(def) = raw {
                    for (key, value) in def {
                        out.entry(key.clone()).or_insert_with(|| value.clone());
                    }
                }
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => items
            .iter()
            .map(|v| inline_refs(stream, v, definitions))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}
