//! Evidence record types.
//!
//! These types mirror the on-disk table schemas exactly; the `csv` crate
//! serializes struct fields in declaration order, so field order here IS
//! the column order.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Column set of the quotes table, order-significant.
pub const QUOTE_COLUMNS: [&str; 9] = [
    "participant_id",
    "transcript_id",
    "question_ref",
    "tag",
    "severity",
    "sentiment",
    "quote",
    "source_line_start",
    "source_line_end",
];

/// Column set of the consolidated quotes table: the nine quote columns
/// plus the resolved consolidated tag.
pub const CONSOLIDATED_COLUMNS: [&str; 10] = [
    "participant_id",
    "transcript_id",
    "question_ref",
    "tag",
    "severity",
    "sentiment",
    "quote",
    "source_line_start",
    "source_line_end",
    "consolidated_tag",
];

/// Pain-point severity, validated at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        };
        f.write_str(s)
    }
}

/// One extracted quotation with its attribution.
///
/// Immutable once validated. The line fields are populated by upstream
/// extraction and echoed verbatim through consolidation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub participant_id: String,
    pub transcript_id: String,
    pub question_ref: String,
    pub tag: String,
    pub severity: Severity,
    pub sentiment: String,
    pub quote: String,
    pub source_line_start: Option<u32>,
    pub source_line_end: Option<u32>,
}

/// A quote record plus its resolved consolidated tag.
///
/// Every non-tag field must be a verbatim copy of the source record; the
/// integrity checker enforces this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedRow {
    pub participant_id: String,
    pub transcript_id: String,
    pub question_ref: String,
    pub tag: String,
    pub severity: Severity,
    pub sentiment: String,
    pub quote: String,
    pub source_line_start: Option<u32>,
    pub source_line_end: Option<u32>,
    pub consolidated_tag: String,
}

impl ConsolidatedRow {
    /// Attach a consolidated tag to a source record.
    pub fn from_record(record: &QuoteRecord, consolidated_tag: &str) -> Self {
        Self {
            participant_id: record.participant_id.clone(),
            transcript_id: record.transcript_id.clone(),
            question_ref: record.question_ref.clone(),
            tag: record.tag.clone(),
            severity: record.severity,
            sentiment: record.sentiment.clone(),
            quote: record.quote.clone(),
            source_line_start: record.source_line_start,
            source_line_end: record.source_line_end,
            consolidated_tag: consolidated_tag.to_string(),
        }
    }

    /// The source-record view of this row, for copy-fidelity comparison.
    pub fn source_fields(&self) -> QuoteRecord {
        QuoteRecord {
            participant_id: self.participant_id.clone(),
            transcript_id: self.transcript_id.clone(),
            question_ref: self.question_ref.clone(),
            tag: self.tag.clone(),
            severity: self.severity,
            sentiment: self.sentiment.clone(),
            quote: self.quote.clone(),
            source_line_start: self.source_line_start,
            source_line_end: self.source_line_end,
        }
    }
}

/// Name of the first quote column that differs between a source record and
/// a consolidated row, if any.
pub fn first_divergent_column(source: &QuoteRecord, row: &ConsolidatedRow) -> Option<&'static str> {
    if source.participant_id != row.participant_id {
        return Some("participant_id");
    }
    if source.transcript_id != row.transcript_id {
        return Some("transcript_id");
    }
    if source.question_ref != row.question_ref {
        return Some("question_ref");
    }
    if source.tag != row.tag {
        return Some("tag");
    }
    if source.severity != row.severity {
        return Some("severity");
    }
    if source.sentiment != row.sentiment {
        return Some("sentiment");
    }
    if source.quote != row.quote {
        return Some("quote");
    }
    if source.source_line_start != row.source_line_start {
        return Some("source_line_start");
    }
    if source.source_line_end != row.source_line_end {
        return Some("source_line_end");
    }
    None
}
