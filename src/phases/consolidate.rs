//! Tag-consolidation phase.
//!
//! Applies the externally authored tag mapping to the source quote table
//! and materializes the consolidated table, the crosswalk, and a markdown
//! report. Every quality gate runs before anything is written: a mapping
//! that fails coverage or the distribution bounds leaves no partial
//! artifacts behind.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use tracing::info;

use crate::config::ResolvedConfig;
use crate::consolidate::{
    check_consolidation, parse_mapping, tag_counts, Crosswalk, TagMapping,
};
use crate::domain::{ConsolidatedRow, QuoteRecord, QUOTE_COLUMNS};
use crate::tables;

use super::display_rel;

/// Outcome of one consolidation run.
#[derive(Debug)]
pub struct ConsolidateSummary {
    pub rows: usize,
    pub original_tags: usize,
    pub consolidated_tags: usize,
    pub warnings: Vec<String>,
}

/// Run tag consolidation over the configured inputs.
pub fn run(config: &ResolvedConfig) -> Result<ConsolidateSummary> {
    let mut warnings: Vec<String> = Vec::new();
    let mut errors: Vec<String> = Vec::new();

    let records: Vec<QuoteRecord> =
        tables::read_non_empty_table(&config.quotes, &QUOTE_COLUMNS)?;

    let mapping_text = tables::read_text(&config.mapping)?;
    let load = parse_mapping(&mapping_text);
    warnings.extend(load.warnings.clone());
    errors.extend(load.errors.iter().map(|e| e.to_string()));

    if errors.is_empty() {
        // Coverage: every source tag must be mapped; mapping entries never
        // referenced by a source row only warrant a warning.
        let source_counts = tag_counts(&records);
        let missing: Vec<&str> = source_counts
            .keys()
            .map(String::as_str)
            .filter(|tag| load.mapping.get(tag).is_none())
            .collect();
        let extra: Vec<&str> = load
            .mapping
            .originals()
            .filter(|tag| !source_counts.contains_key(*tag))
            .collect();

        if !missing.is_empty() {
            errors.push(format!(
                "{} original tag(s) missing from mapping: {}",
                missing.len(),
                preview_list(&missing)
            ));
        }
        if !extra.is_empty() {
            warnings.push(format!(
                "{} mapping tag(s) not present in the source table: {}",
                extra.len(),
                preview_list(&extra)
            ));
        }
    }

    if !errors.is_empty() {
        print_failure(config, &warnings, &errors);
        bail!("tag consolidation failed with {} error(s)", errors.len());
    }

    let crosswalk = Crosswalk::derive(&records, &load.mapping);
    let consolidated: Vec<ConsolidatedRow> = records
        .iter()
        .map(|record| {
            // Coverage passed, so every tag resolves.
            let tag = load.mapping.get(&record.tag).unwrap_or_default();
            ConsolidatedRow::from_record(record, tag)
        })
        .collect();

    // Quality gates before any artifact is written. The structural checks
    // pass by construction here; this enforces the statistical policy.
    let outcome = check_consolidation(&records, &consolidated, &crosswalk, &config.thresholds);
    if !outcome.is_pass() {
        errors.extend(outcome.errors.iter().map(|e| e.to_string()));
        print_failure(config, &warnings, &errors);
        bail!("tag consolidation failed with {} error(s)", errors.len());
    }

    tables::write_table(&config.consolidated, &consolidated)?;
    tables::write_table(&config.crosswalk, &crosswalk.rows())?;

    let report = render_report(config, &records, &load.mapping, &consolidated, &warnings);
    if let Some(parent) = config.consolidation_report.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&config.consolidation_report, report)?;

    let consolidated_tags = distinct_consolidated(&consolidated).len();
    let summary = ConsolidateSummary {
        rows: consolidated.len(),
        original_tags: tag_counts(&records).len(),
        consolidated_tags,
        warnings: warnings.clone(),
    };

    info!(
        rows = summary.rows,
        original_tags = summary.original_tags,
        consolidated_tags = summary.consolidated_tags,
        "tag consolidation finished"
    );
    print_success(config, &summary);

    Ok(summary)
}

fn distinct_consolidated(consolidated: &[ConsolidatedRow]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for row in consolidated {
        let tag = row.consolidated_tag.trim();
        if tag.is_empty() {
            continue;
        }
        *counts.entry(tag.to_string()).or_insert(0usize) += 1;
    }
    counts
}

/// Deterministic markdown report: distribution and cluster-audit tables
/// with fully specified sort orders, no timestamps.
fn render_report(
    config: &ResolvedConfig,
    records: &[QuoteRecord],
    mapping: &TagMapping,
    consolidated: &[ConsolidatedRow],
    warnings: &[String],
) -> String {
    let original_tags = tag_counts(records);
    let consolidated_counts = distinct_consolidated(consolidated);

    let mut lines: Vec<String> = vec![
        "# Tag Consolidation Report".to_string(),
        String::new(),
        format!("- Source file: `{}`", display_rel(&config.quotes, &config.root)),
        format!("- Mapping file: `{}`", display_rel(&config.mapping, &config.root)),
        format!(
            "- Output file: `{}`",
            display_rel(&config.consolidated, &config.root)
        ),
        format!(
            "- Crosswalk file: `{}`",
            display_rel(&config.crosswalk, &config.root)
        ),
        String::new(),
        "## Summary".to_string(),
        String::new(),
        format!("- Total quote rows: {}", consolidated.len()),
        format!("- Original unique tags: {}", original_tags.len()),
        format!("- Consolidated unique tags: {}", consolidated_counts.len()),
        "- Semantic quality checks: PASS".to_string(),
        String::new(),
        "## Consolidated Tag Distribution".to_string(),
        String::new(),
        "| consolidated_tag | quote_count |".to_string(),
        "|---|---:|".to_string(),
    ];

    let mut by_count: Vec<(&String, &usize)> = consolidated_counts.iter().collect();
    by_count.sort_by(|a, b| {
        b.1.cmp(a.1)
            .then_with(|| a.0.to_lowercase().cmp(&b.0.to_lowercase()))
    });
    for (tag, count) in by_count {
        lines.push(format!("| {} | {} |", tag, count));
    }

    lines.extend([
        String::new(),
        "## Cluster Audit".to_string(),
        String::new(),
        "| consolidated_tag | mapped_original_tags | sample_original_tags |".to_string(),
        "|---|---:|---|".to_string(),
    ]);

    let mut clusters: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for (original, consolidated_tag) in mapping.iter() {
        if original_tags.contains_key(original) {
            clusters
                .entry(consolidated_tag.to_string())
                .or_default()
                .push(original);
        }
    }
    let mut cluster_names: Vec<&String> = clusters.keys().collect();
    cluster_names.sort_by_key(|name| name.to_lowercase());
    for name in cluster_names {
        let originals = &clusters[name];
        let mut sample = originals.iter().take(2).copied().collect::<Vec<_>>().join(", ");
        if originals.len() > 2 {
            sample.push_str(", ...");
        }
        lines.push(format!("| {} | {} | {} |", name, originals.len(), sample));
    }

    if !warnings.is_empty() {
        lines.push(String::new());
        lines.push("## Warnings".to_string());
        lines.push(String::new());
        for warning in warnings {
            lines.push(format!("- {}", warning));
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

fn print_header(config: &ResolvedConfig) {
    println!();
    println!("Consolidate Quote Tags");
    println!("{}", "─".repeat(50));
    println!(
        "  Source quotes       : {}",
        display_rel(&config.quotes, &config.root)
    );
    println!(
        "  Mapping file        : {}",
        display_rel(&config.mapping, &config.root)
    );
    println!(
        "  Output consolidated : {}",
        display_rel(&config.consolidated, &config.root)
    );
    println!(
        "  Output crosswalk    : {}",
        display_rel(&config.crosswalk, &config.root)
    );
    println!(
        "  Report              : {}",
        display_rel(&config.consolidation_report, &config.root)
    );
}

fn print_warnings(warnings: &[String]) {
    if !warnings.is_empty() {
        println!();
        println!("WARNINGS ({}):", warnings.len());
        for warning in warnings {
            println!("  WARN  {}", warning);
        }
    }
}

fn print_failure(config: &ResolvedConfig, warnings: &[String], errors: &[String]) {
    print_header(config);
    print_warnings(warnings);
    println!();
    println!("ERRORS ({}):", errors.len());
    for error in errors {
        println!("  FAIL  {}", error);
    }
    println!();
    println!("Status: FAIL");
}

fn print_success(config: &ResolvedConfig, summary: &ConsolidateSummary) {
    print_header(config);
    print_warnings(&summary.warnings);
    println!();
    println!("  Quote rows          : {}", summary.rows);
    println!("  Original tags       : {}", summary.original_tags);
    println!("  Consolidated tags   : {}", summary.consolidated_tags);
    println!();
    println!("Status: PASS");
}

/// First twenty items, comma-joined, `...`-terminated when truncated.
fn preview_list(items: &[&str]) -> String {
    let shown = items.iter().take(20).copied().collect::<Vec<_>>().join(", ");
    if items.len() > 20 {
        format!("{}...", shown)
    } else {
        shown
    }
}
