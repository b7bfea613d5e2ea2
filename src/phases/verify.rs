//! Consolidation-verification phase.
//!
//! Cross-validates the source quote table, the consolidated table, and the
//! crosswalk on disk. Unlike the consolidate phase, this one trusts
//! nothing: the artifacts may have been hand-edited or rebuilt from a
//! stale mapping since they were written.

use anyhow::{bail, Result};
use tracing::info;

use crate::config::ResolvedConfig;
use crate::consolidate::{
    check_consolidation, tag_counts, Crosswalk, CrosswalkRow, CROSSWALK_COLUMNS,
};
use crate::domain::{ConsolidatedRow, QuoteRecord, CONSOLIDATED_COLUMNS, QUOTE_COLUMNS};
use crate::tables;

use super::display_rel;

/// Outcome of one verification run.
#[derive(Debug)]
pub struct VerifySummary {
    pub source_rows: usize,
    pub consolidated_rows: usize,
    pub warnings: Vec<String>,
}

/// Run consolidation verification over the configured artifacts.
pub fn run(config: &ResolvedConfig) -> Result<VerifySummary> {
    let mut warnings: Vec<String> = Vec::new();
    let mut errors: Vec<String> = Vec::new();

    // Load all three tables first so every input defect is reported in one
    // pass, not one per run.
    let source: Vec<QuoteRecord> = match tables::read_table(&config.quotes, &QUOTE_COLUMNS) {
        Ok(rows) => rows,
        Err(e) => {
            errors.push(e.to_string());
            Vec::new()
        }
    };
    let consolidated: Vec<ConsolidatedRow> =
        match tables::read_table(&config.consolidated, &CONSOLIDATED_COLUMNS) {
            Ok(rows) => rows,
            Err(e) => {
                errors.push(e.to_string());
                Vec::new()
            }
        };
    let crosswalk_rows: Vec<CrosswalkRow> =
        match tables::read_table(&config.crosswalk, &CROSSWALK_COLUMNS) {
            Ok(rows) => rows,
            Err(e) => {
                errors.push(e.to_string());
                Vec::new()
            }
        };

    if !config.consolidation_report.exists() {
        warnings.push(format!(
            "Missing report file: {}",
            display_rel(&config.consolidation_report, &config.root)
        ));
    }

    let mut summary = VerifySummary {
        source_rows: source.len(),
        consolidated_rows: consolidated.len(),
        warnings: Vec::new(),
    };

    if errors.is_empty() {
        let source_counts = tag_counts(&source);
        let (crosswalk, crosswalk_errors) = Crosswalk::from_rows(&crosswalk_rows, &source_counts);

        if crosswalk_errors.is_empty() {
            let outcome =
                check_consolidation(&source, &consolidated, &crosswalk, &config.thresholds);
            warnings.extend(outcome.warnings);
            errors.extend(outcome.errors.iter().map(|e| e.to_string()));
        } else {
            // A defective crosswalk file is a structural failure in its own
            // right; the cross-table checks would only compound the noise.
            errors.extend(crosswalk_errors.iter().map(|e| e.to_string()));
        }
    }

    summary.warnings = warnings.clone();

    info!(
        source_rows = summary.source_rows,
        consolidated_rows = summary.consolidated_rows,
        errors = errors.len(),
        "consolidation verification finished"
    );
    print_summary(config, &summary, &warnings, &errors);

    if !errors.is_empty() {
        bail!(
            "consolidation verification failed with {} error(s)",
            errors.len()
        );
    }
    Ok(summary)
}

fn print_summary(
    config: &ResolvedConfig,
    summary: &VerifySummary,
    warnings: &[String],
    errors: &[String],
) {
    println!();
    println!("Verify Tag Consolidation");
    println!("{}", "─".repeat(50));
    println!(
        "  Source quotes       : {}",
        display_rel(&config.quotes, &config.root)
    );
    println!(
        "  Consolidated quotes : {}",
        display_rel(&config.consolidated, &config.root)
    );
    println!(
        "  Crosswalk           : {}",
        display_rel(&config.crosswalk, &config.root)
    );
    println!(
        "  Report              : {}",
        display_rel(&config.consolidation_report, &config.root)
    );
    println!("  Source rows         : {}", summary.source_rows);
    println!("  Consolidated rows   : {}", summary.consolidated_rows);

    if !warnings.is_empty() {
        println!();
        println!("WARNINGS ({}):", warnings.len());
        for warning in warnings {
            println!("  WARN  {}", warning);
        }
    }

    if !errors.is_empty() {
        println!();
        println!("ERRORS ({}):", errors.len());
        for error in errors {
            println!("  FAIL  {}", error);
        }
    }

    println!();
    println!(
        "Status: {}",
        if errors.is_empty() { "PASS" } else { "FAIL" }
    );
}
