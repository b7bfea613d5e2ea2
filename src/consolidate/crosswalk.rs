//! Tag crosswalk: the materialized original → consolidated table with
//! occurrence counts.
//!
//! The crosswalk is both an output artifact of consolidation and the
//! ground truth the integrity checker verifies the consolidated table
//! against.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::QuoteRecord;

use super::mapping::TagMapping;

/// Column set of the crosswalk table, order-significant.
pub const CROSSWALK_COLUMNS: [&str; 4] =
    ["original_tag", "consolidated_tag", "original_count", "notes"];

/// One crosswalk table row as stored on disk.
///
/// `original_count` stays a string at this layer so a malformed count can
/// be reported with its row instead of aborting the whole table parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosswalkRow {
    pub original_tag: String,
    pub consolidated_tag: String,
    pub original_count: String,
    pub notes: String,
}

/// A defect in a crosswalk file row. Row numbers are file line numbers
/// (the header is line 1).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrosswalkError {
    #[error("crosswalk line {line}: original_tag is empty")]
    EmptyOriginal { line: usize },

    #[error("crosswalk line {line}: consolidated_tag is empty for '{original}'")]
    EmptyConsolidated { line: usize, original: String },

    #[error("crosswalk line {line}: original_count '{value}' is not an integer")]
    BadCount { line: usize, value: String },

    #[error("crosswalk line {line}: conflicting consolidated_tag for '{original}'")]
    Conflict { line: usize, original: String },

    #[error(
        "crosswalk line {line}: original_count for '{original}' was {found}, expected {expected}"
    )]
    CountMismatch {
        line: usize,
        original: String,
        found: usize,
        expected: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CrosswalkEntry {
    consolidated_tag: String,
    original_count: usize,
}

/// The key-unique crosswalk, iterated in sorted original-tag order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Crosswalk {
    entries: BTreeMap<String, CrosswalkEntry>,
}

impl Crosswalk {
    /// Derive a crosswalk from source records and a mapping.
    ///
    /// Counts come from the records; tags without a mapping entry are
    /// skipped (the caller reports them via the coverage check before
    /// materializing anything).
    pub fn derive(records: &[QuoteRecord], mapping: &TagMapping) -> Self {
        let counts = tag_counts(records);
        let entries = counts
            .into_iter()
            .filter_map(|(tag, count)| {
                mapping.get(&tag).map(|consolidated| {
                    (
                        tag,
                        CrosswalkEntry {
                            consolidated_tag: consolidated.to_string(),
                            original_count: count,
                        },
                    )
                })
            })
            .collect();
        Self { entries }
    }

    /// Rebuild a crosswalk from its table rows, validating each against the
    /// source tag counts. All row defects are collected.
    pub fn from_rows(
        rows: &[CrosswalkRow],
        source_counts: &BTreeMap<String, usize>,
    ) -> (Self, Vec<CrosswalkError>) {
        let mut crosswalk = Self::default();
        let mut errors = Vec::new();

        for (idx, row) in rows.iter().enumerate() {
            let line = idx + 2;
            let original = row.original_tag.trim();
            let consolidated = row.consolidated_tag.trim();
            let count_text = row.original_count.trim();

            if original.is_empty() {
                errors.push(CrosswalkError::EmptyOriginal { line });
                continue;
            }
            if consolidated.is_empty() {
                errors.push(CrosswalkError::EmptyConsolidated {
                    line,
                    original: original.to_string(),
                });
                continue;
            }

            let count = match count_text.parse::<usize>() {
                Ok(n) => Some(n),
                Err(_) => {
                    errors.push(CrosswalkError::BadCount {
                        line,
                        value: count_text.to_string(),
                    });
                    None
                }
            };

            if let Some(existing) = crosswalk.entries.get(original) {
                if existing.consolidated_tag != consolidated {
                    errors.push(CrosswalkError::Conflict {
                        line,
                        original: original.to_string(),
                    });
                }
            }
            crosswalk.entries.insert(
                original.to_string(),
                CrosswalkEntry {
                    consolidated_tag: consolidated.to_string(),
                    original_count: count.unwrap_or(0),
                },
            );

            if let Some(found) = count {
                let expected = source_counts.get(original).copied().unwrap_or(0);
                if found != expected {
                    errors.push(CrosswalkError::CountMismatch {
                        line,
                        original: original.to_string(),
                        found,
                        expected,
                    });
                }
            }
        }

        (crosswalk, errors)
    }

    /// Consolidated tag the crosswalk prescribes for an original tag.
    pub fn prescribed(&self, original: &str) -> Option<&str> {
        self.entries
            .get(original)
            .map(|e| e.consolidated_tag.as_str())
    }

    /// Original tags in sorted order.
    pub fn originals(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Table rows in sorted original-tag order, ready to write.
    pub fn rows(&self) -> Vec<CrosswalkRow> {
        self.entries
            .iter()
            .map(|(original, entry)| CrosswalkRow {
                original_tag: original.clone(),
                consolidated_tag: entry.consolidated_tag.clone(),
                original_count: entry.original_count.to_string(),
                notes: String::new(),
            })
            .collect()
    }
}

/// Occurrence count per original tag, in sorted tag order.
pub fn tag_counts(records: &[QuoteRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.tag.clone()).or_insert(0) += 1;
    }
    counts
}
