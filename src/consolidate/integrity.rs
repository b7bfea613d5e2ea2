//! Consolidation integrity checker.
//!
//! Cross-validates source quote records, the crosswalk, and the
//! materialized consolidated table. Structural checks run first and
//! short-circuit by class — cardinality and distribution bounds are
//! meaningless over structurally broken data. Statistical checks then
//! gate the consolidation's semantic quality: a mapping that renames
//! nothing, funnels everything into one bucket, or hides rows under
//! catch-all names must not pass.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{first_divergent_column, ConsolidatedRow, QuoteRecord};

use super::crosswalk::{tag_counts, Crosswalk};

/// Distribution and cardinality bounds for an acceptable consolidation.
///
/// Loaded once per run (config file may override the policy defaults) and
/// never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityThresholds {
    /// Minimum distinct consolidated tags (default: 35)
    #[serde(default = "default_count_min")]
    pub consolidated_count_min: usize,

    /// Maximum distinct consolidated tags (default: 45)
    #[serde(default = "default_count_max")]
    pub consolidated_count_max: usize,

    /// Ceiling on the fraction of distinct original tags left unchanged
    /// by consolidation (default: 0.35)
    #[serde(default = "default_unchanged_ratio")]
    pub max_unchanged_tag_ratio: f64,

    /// Ceiling on the fraction of rows absorbed by the single most common
    /// consolidated tag (default: 0.20)
    #[serde(default = "default_dominant_ratio")]
    pub max_dominant_row_ratio: f64,

    /// Ceiling on the fraction of rows under catch-all style tag names
    /// (default: 0.15)
    #[serde(default = "default_catch_all_ratio")]
    pub max_catch_all_row_ratio: f64,

    /// Marker words that flag a consolidated tag name as catch-all.
    /// Kept conservative to avoid false positives on legitimate tags.
    #[serde(default = "default_catch_all_markers")]
    pub catch_all_markers: Vec<String>,
}

fn default_count_min() -> usize {
    35
}
fn default_count_max() -> usize {
    45
}
fn default_unchanged_ratio() -> f64 {
    0.35
}
fn default_dominant_ratio() -> f64 {
    0.20
}
fn default_catch_all_ratio() -> f64 {
    0.15
}

fn default_catch_all_markers() -> Vec<String> {
    ["general", "misc", "miscellaneous", "various", "catch-all"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for IntegrityThresholds {
    fn default() -> Self {
        Self {
            consolidated_count_min: default_count_min(),
            consolidated_count_max: default_count_max(),
            max_unchanged_tag_ratio: default_unchanged_ratio(),
            max_dominant_row_ratio: default_dominant_ratio(),
            max_catch_all_row_ratio: default_catch_all_ratio(),
            catch_all_markers: default_catch_all_markers(),
        }
    }
}

/// A consolidation integrity failure. Every message is self-contained:
/// measured value, configured bound, offending row or tag, and the remedy
/// where one is derivable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrityViolation {
    #[error(
        "Row count mismatch: source={source_count} consolidated={consolidated}. \
         The consolidated table must carry exactly one row per source quote"
    )]
    RowCountMismatch { source_count: usize, consolidated: usize },

    #[error("{count} source tag(s) have no mapping entry: {preview}")]
    MissingMappings { count: usize, preview: String },

    #[error("consolidated row {row}: source column '{column}' changed (expected verbatim copy)")]
    FieldChanged { row: usize, column: &'static str },

    #[error("consolidated row {row}: consolidated_tag is empty")]
    EmptyConsolidatedTag { row: usize },

    #[error(
        "consolidated row {row}: consolidated_tag '{found}' does not match \
         crosswalk '{expected}' for original tag '{original}'"
    )]
    CrosswalkMismatch {
        row: usize,
        original: String,
        found: String,
        expected: String,
    },

    #[error(
        "Unchanged-tag ratio was {:.1}% ({unchanged}/{distinct}), above limit {:.0}%. \
         Mapping is too pass-through; merge near-semantic neighbors",
        .ratio * 100.0, .limit * 100.0
    )]
    UnchangedTagRatio {
        unchanged: usize,
        distinct: usize,
        ratio: f64,
        limit: f64,
    },

    #[error(
        "Dominant consolidated tag '{tag}' covered {:.1}% of rows, above limit {:.0}%. \
         Clusters are too broad; split overloaded consolidated tags",
        .ratio * 100.0, .limit * 100.0
    )]
    DominantTag { tag: String, ratio: f64, limit: f64 },

    #[error(
        "Catch-all style consolidated tags covered {:.1}% of rows, above limit {:.0}%. \
         Rename catch-all buckets into coherent themes",
        .ratio * 100.0, .limit * 100.0
    )]
    CatchAllRatio { ratio: f64, limit: f64 },

    #[error(
        "Consolidated unique tag count {count} was below {min}-{max}. \
         Re-run the mapping and split overloaded consolidated tags"
    )]
    CardinalityLow { count: usize, min: usize, max: usize },

    #[error(
        "Consolidated unique tag count {count} was above {min}-{max}. \
         Re-run the mapping and merge near-semantic neighbors"
    )]
    CardinalityHigh { count: usize, min: usize, max: usize },
}

impl IntegrityViolation {
    /// Structural violations invalidate the table itself; statistical ones
    /// only score its quality.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            IntegrityViolation::RowCountMismatch { .. }
                | IntegrityViolation::MissingMappings { .. }
                | IntegrityViolation::FieldChanged { .. }
                | IntegrityViolation::EmptyConsolidatedTag { .. }
                | IntegrityViolation::CrosswalkMismatch { .. }
        )
    }
}

/// Outcome of one integrity run: every error found before the first
/// short-circuit boundary, plus warnings.
#[derive(Debug, Clone, Default)]
pub struct IntegrityOutcome {
    pub errors: Vec<IntegrityViolation>,
    pub warnings: Vec<String>,
}

impl IntegrityOutcome {
    pub fn is_pass(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Run the full structural + statistical check suite.
///
/// Structural classes short-circuit: row parity, then coverage, then
/// verbatim-copy fidelity, then mapping consistency. Statistical checks
/// (unchanged-tag, dominant-tag, catch-all — all evaluated together) run
/// only over a structurally clean table, and the cardinality bound only
/// when the other statistical checks pass.
pub fn check_consolidation(
    source: &[QuoteRecord],
    consolidated: &[ConsolidatedRow],
    crosswalk: &Crosswalk,
    thresholds: &IntegrityThresholds,
) -> IntegrityOutcome {
    let mut outcome = IntegrityOutcome::default();

    // Class 1: row parity. A wrong row count makes every positional check
    // below meaningless, so this is the only violation reported.
    if source.len() != consolidated.len() {
        outcome.errors.push(IntegrityViolation::RowCountMismatch {
            source_count: source.len(),
            consolidated: consolidated.len(),
        });
        return outcome;
    }

    // Class 2: coverage. Every source tag needs a crosswalk entry; entries
    // never referenced by a source row are only worth a warning.
    let source_counts = tag_counts(source);
    let missing: Vec<&str> = source_counts
        .keys()
        .map(String::as_str)
        .filter(|tag| crosswalk.prescribed(tag).is_none())
        .collect();
    let extra: Vec<&str> = crosswalk
        .originals()
        .filter(|tag| !source_counts.contains_key(*tag))
        .collect();

    if !extra.is_empty() {
        outcome.warnings.push(format!(
            "{} crosswalk tag(s) not present in the source table: {}",
            extra.len(),
            preview_list(&extra)
        ));
    }
    if !missing.is_empty() {
        outcome.errors.push(IntegrityViolation::MissingMappings {
            count: missing.len(),
            preview: preview_list(&missing),
        });
        return outcome;
    }

    // Class 3: verbatim-copy fidelity, all rows, first divergent column
    // per row.
    for (idx, (record, row)) in source.iter().zip(consolidated.iter()).enumerate() {
        if let Some(column) = first_divergent_column(record, row) {
            outcome.errors.push(IntegrityViolation::FieldChanged {
                row: idx + 1,
                column,
            });
        }
    }
    if !outcome.errors.is_empty() {
        return outcome;
    }

    // Class 4: mapping consistency against the crosswalk ground truth.
    for (idx, (record, row)) in source.iter().zip(consolidated.iter()).enumerate() {
        let found = row.consolidated_tag.trim();
        if found.is_empty() {
            outcome
                .errors
                .push(IntegrityViolation::EmptyConsolidatedTag { row: idx + 1 });
            continue;
        }
        // Coverage already passed, so the prescription exists.
        if let Some(expected) = crosswalk.prescribed(&record.tag) {
            if found != expected {
                outcome.errors.push(IntegrityViolation::CrosswalkMismatch {
                    row: idx + 1,
                    original: record.tag.clone(),
                    found: found.to_string(),
                    expected: expected.to_string(),
                });
            }
        }
    }
    if !outcome.errors.is_empty() {
        return outcome;
    }

    if source.is_empty() {
        return outcome;
    }

    // Statistical checks: all three evaluated, failures collected together.
    let semantic_before = outcome.errors.len();
    check_unchanged_ratio(&mut outcome, &source_counts, crosswalk, thresholds);

    let consolidated_counts = consolidated_tag_counts(consolidated);
    let total_rows = consolidated.len();
    check_dominant_tag(&mut outcome, &consolidated_counts, total_rows, thresholds);
    check_catch_all(&mut outcome, &consolidated_counts, total_rows, thresholds);

    // Cardinality is enforced only after the distribution checks pass.
    if outcome.errors.len() == semantic_before {
        check_cardinality(&mut outcome, &consolidated_counts, thresholds);
    }

    outcome
}

fn check_unchanged_ratio(
    outcome: &mut IntegrityOutcome,
    source_counts: &BTreeMap<String, usize>,
    crosswalk: &Crosswalk,
    thresholds: &IntegrityThresholds,
) {
    let distinct = source_counts.len();
    let unchanged = source_counts
        .keys()
        .filter(|tag| {
            crosswalk
                .prescribed(tag)
                .is_some_and(|c| c.trim().eq_ignore_ascii_case(tag.trim()))
        })
        .count();

    let ratio = unchanged as f64 / distinct as f64;
    if ratio > thresholds.max_unchanged_tag_ratio {
        outcome.errors.push(IntegrityViolation::UnchangedTagRatio {
            unchanged,
            distinct,
            ratio,
            limit: thresholds.max_unchanged_tag_ratio,
        });
    }
}

fn check_dominant_tag(
    outcome: &mut IntegrityOutcome,
    consolidated_counts: &BTreeMap<String, usize>,
    total_rows: usize,
    thresholds: &IntegrityThresholds,
) {
    // Sorted map iteration makes the ties deterministic: highest count,
    // then lexicographically first name.
    let dominant = consolidated_counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)));

    if let Some((tag, &count)) = dominant {
        let ratio = count as f64 / total_rows as f64;
        if ratio > thresholds.max_dominant_row_ratio {
            outcome.errors.push(IntegrityViolation::DominantTag {
                tag: tag.clone(),
                ratio,
                limit: thresholds.max_dominant_row_ratio,
            });
        }
    }
}

fn check_catch_all(
    outcome: &mut IntegrityOutcome,
    consolidated_counts: &BTreeMap<String, usize>,
    total_rows: usize,
    thresholds: &IntegrityThresholds,
) {
    let catch_all_rows: usize = consolidated_counts
        .iter()
        .filter(|(tag, _)| {
            let name = tag.to_ascii_lowercase();
            thresholds
                .catch_all_markers
                .iter()
                .any(|marker| name.contains(marker.as_str()))
        })
        .map(|(_, count)| count)
        .sum();

    let ratio = catch_all_rows as f64 / total_rows as f64;
    if ratio > thresholds.max_catch_all_row_ratio {
        outcome.errors.push(IntegrityViolation::CatchAllRatio {
            ratio,
            limit: thresholds.max_catch_all_row_ratio,
        });
    }
}

fn check_cardinality(
    outcome: &mut IntegrityOutcome,
    consolidated_counts: &BTreeMap<String, usize>,
    thresholds: &IntegrityThresholds,
) {
    let count = consolidated_counts.len();
    if count < thresholds.consolidated_count_min {
        outcome.errors.push(IntegrityViolation::CardinalityLow {
            count,
            min: thresholds.consolidated_count_min,
            max: thresholds.consolidated_count_max,
        });
    } else if count > thresholds.consolidated_count_max {
        outcome.errors.push(IntegrityViolation::CardinalityHigh {
            count,
            min: thresholds.consolidated_count_min,
            max: thresholds.consolidated_count_max,
        });
    }
}

/// Distinct trimmed, non-empty consolidated tags with their row counts.
fn consolidated_tag_counts(consolidated: &[ConsolidatedRow]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for row in consolidated {
        let tag = row.consolidated_tag.trim();
        if tag.is_empty() {
            continue;
        }
        *counts.entry(tag.to_string()).or_insert(0) += 1;
    }
    counts
}

/// First twenty items of a sorted list, comma-joined, `...`-terminated
/// when truncated.
fn preview_list(items: &[&str]) -> String {
    let shown = items.iter().take(20).copied().collect::<Vec<_>>().join(", ");
    if items.len() > 20 {
        format!("{}...", shown)
    } else {
        shown
    }
}
