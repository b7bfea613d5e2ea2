//! Tag-mapping loader.
//!
//! Parses an externally authored original-tag → consolidated-tag mapping.
//! Two payload shapes are accepted: the canonical
//! `{"mappings": [{"original_tag": ..., "consolidated_tag": ...}, ...]}`
//! list, and a flat `{original: consolidated}` object kept for backward
//! compatibility (tolerated with a warning).
//!
//! The loader never infers a mapping: a tag absent from the table stays
//! absent, and the caller reports it missing. All entry defects are
//! collected and returned together, never first-error-wins.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

/// A defect in the mapping payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("Mapping JSON could not be parsed: {detail}")]
    Unparseable { detail: String },

    #[error("Mapping JSON must be an object with a 'mappings' list")]
    NotAnObject,

    #[error("Mapping entry {index} is not an object")]
    EntryNotObject { index: usize },

    #[error("Mapping entry {index} missing original_tag")]
    MissingOriginal { index: usize },

    #[error("Mapping entry {index} missing consolidated_tag for '{original}'")]
    MissingConsolidated { index: usize, original: String },

    #[error("Conflicting mapping for '{original}': '{existing}' vs '{conflicting}'")]
    Conflict {
        original: String,
        existing: String,
        conflicting: String,
    },
}

/// The key-unique original → consolidated table.
///
/// Backed by a `BTreeMap` so every iteration over the mapping is in sorted
/// key order, keeping derived artifacts deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMapping {
    entries: BTreeMap<String, String>,
}

impl TagMapping {
    /// Consolidated tag for an original tag, if mapped.
    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Original tags in sorted order.
    pub fn originals(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[cfg(test)]
    pub(crate) fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Result of loading a mapping payload: whatever parsed cleanly, plus every
/// warning and defect encountered.
#[derive(Debug, Clone, Default)]
pub struct MappingLoad {
    pub mapping: TagMapping,
    pub warnings: Vec<String>,
    pub errors: Vec<MappingError>,
}

impl MappingLoad {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse a mapping payload from JSON text.
pub fn parse_mapping(json: &str) -> MappingLoad {
    let mut load = MappingLoad::default();

    let value: Value = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(e) => {
            load.errors.push(MappingError::Unparseable {
                detail: e.to_string(),
            });
            return load;
        }
    };

    let Value::Object(object) = value else {
        load.errors.push(MappingError::NotAnObject);
        return load;
    };

    match object.get("mappings") {
        Some(Value::Array(entries)) => {
            for (idx, entry) in entries.iter().enumerate() {
                ingest_entry(&mut load, idx + 1, entry);
            }
        }
        _ => {
            // Backward-compatible shorthand: {original_tag: consolidated_tag}.
            load.warnings.push(
                "Using shorthand mapping format; preferred format is {\"mappings\": [...]}"
                    .to_string(),
            );
            // Sort keys so entry positions in diagnostics are stable.
            let flat: BTreeMap<&String, &Value> = object.iter().collect();
            for (idx, (key, value)) in flat.into_iter().enumerate() {
                let entry = serde_json::json!({
                    "original_tag": key,
                    "consolidated_tag": value,
                });
                ingest_entry(&mut load, idx + 1, &entry);
            }
        }
    }

    load
}

fn ingest_entry(load: &mut MappingLoad, index: usize, entry: &Value) {
    let Value::Object(fields) = entry else {
        load.errors.push(MappingError::EntryNotObject { index });
        return;
    };

    let original = fields
        .get("original_tag")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string();
    if original.is_empty() {
        load.errors.push(MappingError::MissingOriginal { index });
        return;
    }

    let consolidated = fields
        .get("consolidated_tag")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string();
    if consolidated.is_empty() {
        load.errors
            .push(MappingError::MissingConsolidated { index, original });
        return;
    }

    match load.mapping.entries.entry(original) {
        Entry::Vacant(slot) => {
            slot.insert(consolidated);
        }
        Entry::Occupied(slot) => {
            // Same value twice is tolerated silently; a different value is
            // a hard conflict.
            if slot.get() != &consolidated {
                load.errors.push(MappingError::Conflict {
                    original: slot.key().clone(),
                    existing: slot.get().clone(),
                    conflicting: consolidated,
                });
            }
        }
    }
}
