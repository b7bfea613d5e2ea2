//! Validation report records.

use serde::{Deserialize, Serialize};

use crate::evidence::{MatchFailure, QuoteMatch};

use super::record::QuoteRecord;

/// Column set of the validation report, order-significant.
pub const REPORT_COLUMNS: [&str; 8] = [
    "participant_id",
    "transcript_id",
    "question_ref",
    "tag",
    "status",
    "reason",
    "transcript_match",
    "transcript_lines",
];

/// Verdict for one quote record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchStatus {
    Pass,
    Fail,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pass => "PASS",
            MatchStatus::Fail => "FAIL",
        }
    }
}

/// One row of the quote-validation report.
///
/// On PASS, `reason` is empty and `transcript_match`/`transcript_lines`
/// carry the verbatim matched text and its source line range(s). On FAIL
/// the reverse holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRow {
    pub participant_id: String,
    pub transcript_id: String,
    pub question_ref: String,
    pub tag: String,
    pub status: MatchStatus,
    pub reason: String,
    pub transcript_match: String,
    pub transcript_lines: String,
}

impl ValidationRow {
    /// Report row for a verified quote.
    pub fn pass(record: &QuoteRecord, matched: &QuoteMatch) -> Self {
        Self {
            participant_id: record.participant_id.clone(),
            transcript_id: record.transcript_id.clone(),
            question_ref: record.question_ref.clone(),
            tag: record.tag.clone(),
            status: MatchStatus::Pass,
            reason: String::new(),
            transcript_match: matched.text.clone(),
            transcript_lines: matched.lines_display(),
        }
    }

    /// Report row for a quote that failed matching.
    pub fn fail_match(record: &QuoteRecord, failure: &MatchFailure) -> Self {
        Self::fail_with_reason(record, failure.to_string())
    }

    /// Report row for a record that failed before matching could run,
    /// e.g. a participant missing from the manifest.
    pub fn fail_with_reason(record: &QuoteRecord, reason: String) -> Self {
        Self {
            participant_id: record.participant_id.clone(),
            transcript_id: record.transcript_id.clone(),
            question_ref: record.question_ref.clone(),
            tag: record.tag.clone(),
            status: MatchStatus::Fail,
            reason,
            transcript_match: String::new(),
            transcript_lines: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::Severity;
    use crate::evidence::LineRange;

    fn record() -> QuoteRecord {
        QuoteRecord {
            participant_id: "P03".into(),
            transcript_id: "T03".into(),
            question_ref: "Q1".into(),
            tag: "export-failures".into(),
            severity: Severity::Medium,
            sentiment: "annoyed".into(),
            quote: "the export kept failing".into(),
            source_line_start: Some(40),
            source_line_end: Some(41),
        }
    }

    #[test]
    fn test_pass_row() {
        let matched = QuoteMatch {
            text: "the export kept failing".into(),
            line_ranges: vec![LineRange { start: 40, end: 41 }],
        };
        let row = ValidationRow::pass(&record(), &matched);
        assert_eq!(row.status, MatchStatus::Pass);
        assert!(row.reason.is_empty());
        assert_eq!(row.transcript_lines, "40-41");
    }

    #[test]
    fn test_fail_row_carries_reason() {
        let row = ValidationRow::fail_match(&record(), &MatchFailure::QuoteNotFound);
        assert_eq!(row.status, MatchStatus::Fail);
        assert_eq!(row.reason, "Quote not found in transcript");
        assert!(row.transcript_match.is_empty());
    }

    #[test]
    fn test_status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&MatchStatus::Pass).unwrap(),
            "\"PASS\""
        );
    }
}
