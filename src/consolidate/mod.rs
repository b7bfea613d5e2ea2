//! Tag-consolidation integrity.
//!
//! Loads the externally authored tag mapping, derives the crosswalk, and
//! verifies that a materialized consolidated table is a faithful,
//! non-degenerate consolidation of the source quote records.

pub mod crosswalk;
pub mod integrity;
pub mod mapping;

pub use crosswalk::{tag_counts, Crosswalk, CrosswalkError, CrosswalkRow, CROSSWALK_COLUMNS};
pub use integrity::{
    check_consolidation, IntegrityOutcome, IntegrityThresholds, IntegrityViolation,
};
pub use mapping::{parse_mapping, MappingError, MappingLoad, TagMapping};
