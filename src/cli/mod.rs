//! Command-line interface for attest.
//!
//! Provides commands for validating extracted quotes against transcripts,
//! consolidating tags, and verifying consolidation integrity.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use crate::config::ResolvedConfig;
use crate::phases;

/// attest - Evidence integrity engine for qualitative-research pipelines
#[derive(Parser, Debug)]
#[command(name = "attest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pipeline root directory (defaults to ATTEST_ROOT, then the
    /// directory holding .attest/config.yaml, then the current directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate that every extracted quote appears verbatim in its
    /// source transcript
    Validate,

    /// Apply the tag mapping and write consolidated quote/tag artifacts
    Consolidate,

    /// Verify consolidated artifacts for structural fidelity and
    /// distribution quality
    Verify,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let config = ResolvedConfig::load(self.root.as_deref())?;

        match self.command {
            Commands::Validate => {
                let summary = phases::run_validate(&config)?;
                if !summary.all_passed() {
                    bail!(
                        "{} of {} quote(s) failed validation — see {}",
                        summary.failed,
                        summary.checked,
                        summary.report_path.display()
                    );
                }
                Ok(())
            }
            Commands::Consolidate => {
                phases::run_consolidate(&config)?;
                Ok(())
            }
            Commands::Verify => {
                phases::run_verify(&config)?;
                Ok(())
            }
            Commands::Config => {
                show_config(&config);
                Ok(())
            }
        }
    }
}

fn show_config(config: &ResolvedConfig) {
    println!("Resolved configuration:");
    println!("  Root                 : {}", config.root.display());
    match &config.config_file {
        Some(path) => println!("  Config file          : {}", path.display()),
        None => println!("  Config file          : (none found)"),
    }
    println!("  Manifest             : {}", config.manifest.display());
    println!("  Quotes               : {}", config.quotes.display());
    println!(
        "  Validation report    : {}",
        config.validation_report.display()
    );
    println!("  Mapping              : {}", config.mapping.display());
    println!("  Consolidated quotes  : {}", config.consolidated.display());
    println!("  Crosswalk            : {}", config.crosswalk.display());
    println!(
        "  Consolidation report : {}",
        config.consolidation_report.display()
    );
    println!();
    println!("Thresholds:");
    println!(
        "  Consolidated tag count : {}-{}",
        config.thresholds.consolidated_count_min, config.thresholds.consolidated_count_max
    );
    println!(
        "  Unchanged-tag ratio    : <= {:.0}%",
        config.thresholds.max_unchanged_tag_ratio * 100.0
    );
    println!(
        "  Dominant-tag ratio     : <= {:.0}%",
        config.thresholds.max_dominant_row_ratio * 100.0
    );
    println!(
        "  Catch-all row ratio    : <= {:.0}%",
        config.thresholds.max_catch_all_row_ratio * 100.0
    );
    println!(
        "  Catch-all markers      : {}",
        config.thresholds.catch_all_markers.join(", ")
    );
}
