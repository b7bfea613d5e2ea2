//! Batch phase runners.
//!
//! Each phase glues file I/O to the pure engines in `evidence` and
//! `consolidate`: read the configured inputs, run the checks, write the
//! artifacts, print a summary block, and return a summary the CLI turns
//! into an exit code. A run either completes or halts at the first
//! unrecoverable structural error; per-record and per-entry failures are
//! always collected in full.

use std::path::Path;

pub mod consolidate;
pub mod validate;
pub mod verify;

pub use consolidate::{run as run_consolidate, ConsolidateSummary};
pub use validate::{run as run_validate, ValidateSummary};
pub use verify::{run as run_verify, VerifySummary};

/// Render a path relative to the pipeline root where possible.
pub(crate) fn display_rel(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => rel.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}
