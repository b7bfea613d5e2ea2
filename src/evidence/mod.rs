//! Verbatim quote validation.
//!
//! Proves that every extracted quotation genuinely occurs, in order, inside
//! its source transcript — including quotations that elide interior text
//! with a `...` marker.
//!
//! # Design Principles
//!
//! - **Honest failure**: a quote that cannot be located verbatim is
//!   reported with a precise reason, never silently accepted.
//! - **Ordered segments**: an elided quotation must read left-to-right in
//!   transcript order; fragments found out of order fail.
//! - **Line provenance**: every match carries the original line range(s)
//!   it was found on, via the corpus's per-byte offset index.
//!
//! # Example
//!
//! ```
//! use attest::evidence::{match_quote, TranscriptCorpus};
//!
//! let corpus = TranscriptCorpus::from_raw("The export kept failing.\nI gave up.");
//! let m = match_quote(&corpus, "export kept failing ... gave up").unwrap();
//! assert_eq!(m.text, "export kept failing ... gave up");
//! assert_eq!(m.lines_display(), "1, 2");
//! ```

pub mod corpus;
pub mod matcher;
pub mod normalize;

pub use corpus::{CorpusCache, CorpusError, LineRange, TranscriptCorpus};
pub use matcher::{match_quote, MatchFailure, QuoteMatch, ELLIPSIS};
pub use normalize::{fold, normalize, normalize_marks};
