//! `_select` stream and property selection
//!
//! Entries have the form `stream.property[.nested...]`; every segment may
//! contain `*` globs. `*.*` selects everything. An empty list selects
//! everything as well.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use regex::Regex;

/// One compiled `_select` entry
#[derive(Debug, Clone)]
struct SelectRule {
    stream: Regex,
    path: Vec<Regex>,
}

/// Compiled `_select` configuration
#[derive(Debug, Clone, Default)]
pub struct Selection {
    rules: Vec<SelectRule>,
}

impl Selection {
    /// Select every stream and property
    pub fn all() -> Self {
        Self::default()
    }

    /// Compile `_select` entries
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self> {
        let rules = entries
            .iter()
            .map(|entry| compile_rule(entry.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Check if a stream is selected
    pub fn is_selected(&self, stream: &str) -> bool {
        self.rules.is_empty() || self.rules.iter().any(|r| r.stream.is_match(stream))
    }

    /// Property selection for one stream
    pub fn for_stream(&self, stream: &str) -> StreamSelection {
        let paths: Vec<Vec<Regex>> = self
            .rules
            .iter()
            .filter(|r| r.stream.is_match(stream))
            .map(|r| r.path.clone())
            .collect();

        let keep_all = self.rules.is_empty()
            || paths
                .iter()
                .any(|p| p.is_empty() || (p.len() == 1 && p[0].as_str() == MATCH_ALL));

        StreamSelection { paths, keep_all }
    }
}

/// Property selection applied to the records of one stream
#[derive(Debug, Clone)]
pub struct StreamSelection {
    paths: Vec<Vec<Regex>>,
    keep_all: bool,
}

impl StreamSelection {
    /// Check if records pass through unchanged
    pub fn keeps_all(&self) -> bool {
        self.keep_all
    }

    /// Project a record onto the selected properties. `always` names
    /// top-level properties that are kept regardless of selection.
    pub fn project<'a>(
        &self,
        record: JsonValue,
        always: impl IntoIterator<Item = &'a str>,
    ) -> JsonValue {
        if self.keep_all {
            return record;
        }
        let JsonValue::Object(object) = record else {
            return record;
        };

        let always: Vec<&str> = always.into_iter().collect();
        let paths: Vec<&[Regex]> = self.paths.iter().map(Vec::as_slice).collect();

        let mut projected = project_object(object.clone(), &paths);
        for key in always {
            if let Some(value) = object.get(key) {
                projected.insert(key.to_string(), value.clone());
            }
        }
        JsonValue::Object(projected)
    }
}

const MATCH_ALL: &str = "^.*$";

fn project_object(object: JsonObject, paths: &[&[Regex]]) -> JsonObject {
    let mut out = JsonObject::new();
    for (key, value) in object {
        let matching: Vec<&[Regex]> = paths
            .iter()
            .filter(|p| p.first().is_some_and(|seg| seg.is_match(&key)))
            .map(|&p| &p[1..])
            .collect();

        if matching.is_empty() {
            continue;
        }
        if matching.iter().any(|rest| rest.is_empty()) {
            out.insert(key, value);
            continue;
        }
        // Only nested properties were selected
        if let JsonValue::Object(inner) = value {
            let inner = project_object(inner, &matching);
            if !inner.is_empty() {
                out.insert(key, JsonValue::Object(inner));
            }
        }
    }
    out
}

fn compile_rule(entry: &str) -> Result<SelectRule> {
    let entry = entry.trim();
    if entry.is_empty() {
        return Err(Error::invalid_value("_select", "empty selection entry"));
    }

    let mut segments = entry.split('.');
    let stream = segments.next().unwrap_or_default();
    let stream = compile_glob(stream, entry)?;
    let path = segments
        .map(|seg| compile_glob(seg, entry))
        .collect::<Result<Vec<_>>>()?;

    Ok(SelectRule { stream, path })
}

fn compile_glob(segment: &str, entry: &str) -> Result<Regex> {
    if segment.is_empty() {
        return Err(Error::invalid_value(
            "_select",
            format!("empty segment in '{entry}'"),
        ));
    }
    let pattern = format!("^{}$", regex::escape(segment).replace(r"\*", ".*"));
    Regex::new(&pattern)
        .map_err(|e| Error::invalid_value("_select", format!("invalid entry '{entry}': {e}")))
}
