//! Quote-validation phase.
//!
//! Checks that every extracted quote appears verbatim in its source
//! transcript and writes the per-record validation report. Failures are
//! collected per record, never raised on first hit — the caller needs the
//! complete failure set to drive correction.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::ResolvedConfig;
use crate::domain::{Manifest, MatchStatus, QuoteRecord, ValidationRow, QUOTE_COLUMNS};
use crate::evidence::{match_quote, CorpusCache};
use crate::tables;

use super::display_rel;

/// Outcome of one validation run.
#[derive(Debug)]
pub struct ValidateSummary {
    pub checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub report_path: PathBuf,
}

impl ValidateSummary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Run quote validation over the configured inputs.
pub fn run(config: &ResolvedConfig) -> Result<ValidateSummary> {
    let manifest_text = tables::read_text(&config.manifest)?;
    let manifest = Manifest::from_json(&manifest_text).with_context(|| {
        format!(
            "Failed to parse manifest: {}",
            config.manifest.display()
        )
    })?;
    let transcript_paths = manifest.participant_paths(&config.root);

    let records: Vec<QuoteRecord> = tables::read_table(&config.quotes, &QUOTE_COLUMNS)?;

    let mut cache = CorpusCache::new();
    let mut rows: Vec<ValidationRow> = Vec::with_capacity(records.len());

    for record in &records {
        let Some(path) = transcript_paths.get(&record.participant_id) else {
            rows.push(ValidationRow::fail_with_reason(
                record,
                format!(
                    "participant_id '{}' not in manifest",
                    record.participant_id
                ),
            ));
            continue;
        };

        let corpus = match cache.get_or_load(&record.participant_id, path) {
            Ok(corpus) => corpus,
            Err(err) => {
                rows.push(ValidationRow::fail_with_reason(record, err.to_string()));
                continue;
            }
        };

        match match_quote(corpus, &record.quote) {
            Ok(matched) => rows.push(ValidationRow::pass(record, &matched)),
            Err(failure) => rows.push(ValidationRow::fail_match(record, &failure)),
        }
    }

    tables::write_table(&config.validation_report, &rows)?;

    let passed = rows.iter().filter(|r| r.status == MatchStatus::Pass).count();
    let failed = rows.len() - passed;
    let summary = ValidateSummary {
        checked: rows.len(),
        passed,
        failed,
        report_path: config.validation_report.clone(),
    };

    info!(
        checked = summary.checked,
        passed = summary.passed,
        failed = summary.failed,
        "quote validation finished"
    );
    print_summary(config, &records, &rows, &summary);

    Ok(summary)
}

fn print_summary(
    config: &ResolvedConfig,
    records: &[QuoteRecord],
    rows: &[ValidationRow],
    summary: &ValidateSummary,
) {
    println!();
    println!("Validate Quotes");
    println!("{}", "─".repeat(50));
    println!("  Quotes checked : {}", summary.checked);
    println!("  PASS           : {}", summary.passed);
    println!("  FAIL           : {}", summary.failed);
    println!(
        "  Report         : {}",
        display_rel(&summary.report_path, &config.root)
    );

    if summary.failed > 0 {
        println!();
        println!("Failed quotes:");
        for (record, row) in records.iter().zip(rows.iter()) {
            if row.status == MatchStatus::Pass {
                continue;
            }
            let preview: String = if record.quote.chars().count() > 80 {
                format!("{}...", record.quote.chars().take(80).collect::<String>())
            } else {
                record.quote.clone()
            };
            println!(
                "  FAIL  [{}] {} / {}",
                row.participant_id, row.question_ref, row.tag
            );
            println!("        Reason : {}", row.reason);
            println!("        Quote  : {}", preview);
        }
    }

    println!();
    println!(
        "Status: {}",
        if summary.all_passed() { "PASS" } else { "FAIL" }
    );
}
