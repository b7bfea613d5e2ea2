//! Data structures shared across the engine.

pub mod manifest;
pub mod record;
pub mod report;

pub use manifest::{Manifest, TranscriptEntry};
pub use record::{
    first_divergent_column, ConsolidatedRow, QuoteRecord, Severity, CONSOLIDATED_COLUMNS,
    QUOTE_COLUMNS,
};
pub use report::{MatchStatus, ValidationRow, REPORT_COLUMNS};
