//! attest - Evidence integrity engine for qualitative-research pipelines
//!
//! Turns raw interview transcripts plus externally extracted quote records
//! into verified, attributable evidence artifacts. Two engines carry the
//! load:
//!
//! - **Quote validation** proves every extracted quotation genuinely
//!   occurs, in order, inside its source transcript — including quotations
//!   that elide interior text with a `...` marker.
//! - **Consolidation integrity** proves that a many-to-one tag mapping
//!   preserved every underlying record and meets distribution quality
//!   bounds (not a no-op renaming, not one giant bucket, not a pile of
//!   catch-all tags).
//!
//! Both engines are pure functions over their inputs; file I/O, report
//! writing, and phase sequencing live in `phases` and the CLI. Everything
//! is single-threaded and deterministic: identical inputs produce
//! byte-identical artifacts on every run.
//!
//! # Modules
//!
//! - `evidence`: text normalization, line-indexed corpus, quote matcher
//! - `consolidate`: mapping loader, crosswalk, integrity checker
//! - `domain`: record and report types
//! - `tables`: CSV/JSON table I/O with exact schema enforcement
//! - `phases`: batch phase runners
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Validate extracted quotes against their transcripts
//! attest validate --root ./study
//!
//! # Apply a tag mapping and write consolidated artifacts
//! attest consolidate --root ./study
//!
//! # Verify consolidated artifacts end to end
//! attest verify --root ./study
//! ```

pub mod cli;
pub mod config;
pub mod consolidate;
pub mod domain;
pub mod evidence;
pub mod phases;
pub mod tables;

// Re-export main types at crate root for convenience
pub use config::ResolvedConfig;
pub use consolidate::{
    check_consolidation, Crosswalk, IntegrityOutcome, IntegrityThresholds, IntegrityViolation,
    TagMapping,
};
pub use domain::{ConsolidatedRow, MatchStatus, QuoteRecord, Severity, ValidationRow};
pub use evidence::{match_quote, CorpusCache, MatchFailure, QuoteMatch, TranscriptCorpus};
