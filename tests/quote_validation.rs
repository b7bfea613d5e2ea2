//! Quote Validation Integration Tests
//!
//! End-to-end runs of the validate phase over a scratch pipeline root.

use std::fs;
use std::path::Path;

use attest::config::ResolvedConfig;
use attest::domain::{MatchStatus, QuoteRecord, Severity, ValidationRow, REPORT_COLUMNS};
use attest::phases;
use attest::tables;

fn record(participant: &str, transcript: &str, tag: &str, quote: &str) -> QuoteRecord {
    QuoteRecord {
        participant_id: participant.into(),
        transcript_id: transcript.into(),
        question_ref: "Q2".into(),
        tag: tag.into(),
        severity: Severity::High,
        sentiment: "frustrated".into(),
        quote: quote.into(),
        source_line_start: Some(12),
        source_line_end: Some(12),
    }
}

fn write_manifest(root: &Path, entries: &[(&str, &str, &str)]) {
    let transcripts: Vec<serde_json::Value> = entries
        .iter()
        .map(|(id, participant, path)| {
            serde_json::json!({"id": id, "participant_id": participant, "path": path})
        })
        .collect();
    let manifest = serde_json::json!({ "transcripts": transcripts });
    fs::write(
        root.join("manifest.json"),
        serde_json::to_string_pretty(&manifest).unwrap(),
    )
    .unwrap();
}

/// Transcript whose line 12 holds the sentence the records below quote.
fn onboarding_transcript() -> String {
    let mut text = String::new();
    for i in 1..=11 {
        text.push_str(&format!("Interviewer filler line number {}.\n", i));
    }
    text.push_str("I was frustrated by the onboarding flow.\n");
    text.push_str("After that it went fine.\n");
    text
}

#[test]
fn test_elided_quote_passes_with_line_provenance() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("transcripts")).unwrap();
    fs::write(root.join("transcripts/p01.md"), onboarding_transcript()).unwrap();
    write_manifest(root, &[("T01", "P01", "transcripts/p01.md")]);

    let records = vec![record(
        "P01",
        "T01",
        "onboarding-friction",
        "I was frustrated ... onboarding flow",
    )];
    tables::write_table(&root.join("quotes.csv"), &records).unwrap();

    let config = ResolvedConfig::for_root(root);
    let summary = phases::run_validate(&config).unwrap();
    assert_eq!(summary.checked, 1);
    assert!(summary.all_passed());

    let rows: Vec<ValidationRow> =
        tables::read_table(&config.validation_report, &REPORT_COLUMNS).unwrap();
    assert_eq!(rows[0].status, MatchStatus::Pass);
    assert_eq!(rows[0].transcript_match, "I was frustrated ... onboarding flow");
    assert_eq!(rows[0].transcript_lines, "12, 12");
    assert!(rows[0].reason.is_empty());
}

#[test]
fn test_reversed_segments_fail() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("transcripts")).unwrap();
    fs::write(root.join("transcripts/p01.md"), onboarding_transcript()).unwrap();
    write_manifest(root, &[("T01", "P01", "transcripts/p01.md")]);

    let records = vec![record(
        "P01",
        "T01",
        "onboarding-friction",
        "onboarding flow ... frustrated",
    )];
    tables::write_table(&root.join("quotes.csv"), &records).unwrap();

    let config = ResolvedConfig::for_root(root);
    let summary = phases::run_validate(&config).unwrap();
    assert_eq!(summary.failed, 1);

    let rows: Vec<ValidationRow> =
        tables::read_table(&config.validation_report, &REPORT_COLUMNS).unwrap();
    assert_eq!(rows[0].status, MatchStatus::Fail);
    assert!(rows[0].reason.starts_with("Segment not found"));
    assert!(rows[0].transcript_match.is_empty());
}

#[test]
fn test_failures_are_collected_not_first_wins() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("transcripts")).unwrap();
    fs::write(root.join("transcripts/p01.md"), onboarding_transcript()).unwrap();
    fs::write(
        root.join("transcripts/p02.md"),
        "The export kept failing on large files.\n",
    )
    .unwrap();
    write_manifest(
        root,
        &[
            ("T01", "P01", "transcripts/p01.md"),
            ("T02", "P02", "transcripts/p02.md"),
            ("T03", "P03", "transcripts/p03-missing.md"),
        ],
    );

    let records = vec![
        record("P01", "T01", "tag-a", "I was frustrated by the onboarding flow"),
        record("P01", "T01", "tag-b", "this text is nowhere"),
        record("P02", "T02", "tag-c", "export kept failing"),
        record("P99", "T99", "tag-d", "whoever this is"),
        record("P03", "T03", "tag-e", "transcript file is gone"),
    ];
    tables::write_table(&root.join("quotes.csv"), &records).unwrap();

    let config = ResolvedConfig::for_root(root);
    let summary = phases::run_validate(&config).unwrap();
    assert_eq!(summary.checked, 5);
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 3);

    let rows: Vec<ValidationRow> =
        tables::read_table(&config.validation_report, &REPORT_COLUMNS).unwrap();
    assert_eq!(rows[1].reason, "Quote not found in transcript");
    assert_eq!(rows[3].reason, "participant_id 'P99' not in manifest");
    assert!(rows[4].reason.starts_with("Transcript not found"));
}

#[test]
fn test_case_and_typography_insensitive_matching() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("transcripts")).unwrap();
    fs::write(
        root.join("transcripts/p01.md"),
        "Honestly, it\u{2019}s been GREAT since the fix.\n",
    )
    .unwrap();
    write_manifest(root, &[("T01", "P01", "transcripts/p01.md")]);

    let records = vec![record("P01", "T01", "post-fix", "it's been great")];
    tables::write_table(&root.join("quotes.csv"), &records).unwrap();

    let config = ResolvedConfig::for_root(root);
    assert!(phases::run_validate(&config).unwrap().all_passed());

    let rows: Vec<ValidationRow> =
        tables::read_table(&config.validation_report, &REPORT_COLUMNS).unwrap();
    // Matched text keeps the transcript's casing, not the claim's.
    assert_eq!(rows[0].transcript_match, "it's been GREAT");
}

#[test]
fn test_match_spanning_lines_reports_range() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("transcripts")).unwrap();
    fs::write(
        root.join("transcripts/p01.md"),
        "the dashboard was slow\nand the filters kept resetting\n",
    )
    .unwrap();
    write_manifest(root, &[("T01", "P01", "transcripts/p01.md")]);

    let records = vec![record(
        "P01",
        "T01",
        "dashboard-perf",
        "slow and the filters",
    )];
    tables::write_table(&root.join("quotes.csv"), &records).unwrap();

    let config = ResolvedConfig::for_root(root);
    phases::run_validate(&config).unwrap();

    let rows: Vec<ValidationRow> =
        tables::read_table(&config.validation_report, &REPORT_COLUMNS).unwrap();
    assert_eq!(rows[0].transcript_lines, "1-2");
}

#[test]
fn test_missing_quotes_table_is_hard_error() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_manifest(root, &[]);

    let config = ResolvedConfig::for_root(root);
    let err = phases::run_validate(&config).unwrap_err();
    assert!(err.to_string().contains("Missing file"));
}

#[test]
fn test_report_column_order() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("transcripts")).unwrap();
    fs::write(root.join("transcripts/p01.md"), "a few words\n").unwrap();
    write_manifest(root, &[("T01", "P01", "transcripts/p01.md")]);
    tables::write_table(
        &root.join("quotes.csv"),
        &[record("P01", "T01", "tag", "few words")],
    )
    .unwrap();

    let config = ResolvedConfig::for_root(root);
    phases::run_validate(&config).unwrap();

    let text = fs::read_to_string(&config.validation_report).unwrap();
    assert_eq!(
        text.lines().next().unwrap(),
        "participant_id,transcript_id,question_ref,tag,status,reason,transcript_match,transcript_lines"
    );
}
