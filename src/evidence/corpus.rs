//! Line-indexed transcript corpus.
//!
//! Wraps one transcript as a single normalized string plus a parallel
//! per-byte index mapping every offset back to the 1-based original line
//! number it came from. Adjacent sentences from different lines become
//! searchable as continuous text while keeping exact line provenance for
//! any matched span.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use super::normalize::{fold, normalize};

/// Failure to materialize a corpus from disk.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Transcript not found: {}", .path.display())]
    Missing { path: PathBuf },

    #[error("Could not read transcript {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// An original-line range for a matched span.
///
/// Displays as `N` when the span stays on one line, `N-M` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// One transcript, normalized and indexed. Read-only after construction.
#[derive(Debug, Clone)]
pub struct TranscriptCorpus {
    /// Normalized full text, original casing preserved.
    text: String,
    /// ASCII-folded copy of `text`, byte-parallel by construction.
    folded: String,
    /// 1-based original line number for every byte of `text`.
    line_of: Vec<u32>,
    /// sha256 digest of the raw source, for drift diagnostics.
    source_digest: String,
}

impl TranscriptCorpus {
    /// Build a corpus from raw transcript text.
    ///
    /// Lines that normalize to nothing are dropped and contribute no
    /// offsets. The single space joining two kept lines is attributed to
    /// the second line's number.
    pub fn from_raw(raw: &str) -> Self {
        let mut text = String::new();
        let mut line_of: Vec<u32> = Vec::new();

        for (idx, line) in raw.lines().enumerate() {
            let lineno = (idx + 1) as u32;
            let norm = normalize(line);
            if norm.is_empty() {
                continue;
            }
            if !text.is_empty() {
                text.push(' ');
                line_of.push(lineno);
            }
            for _ in 0..norm.len() {
                line_of.push(lineno);
            }
            text.push_str(&norm);
        }

        let folded = fold(&text);
        debug_assert_eq!(text.len(), line_of.len());
        debug_assert_eq!(text.len(), folded.len());

        let digest = Sha256::digest(raw.as_bytes());
        Self {
            text,
            folded,
            line_of,
            source_digest: format!("sha256:{}", hex::encode(digest)),
        }
    }

    /// Read a transcript file and build its corpus.
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        if !path.exists() {
            return Err(CorpusError::Missing {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path).map_err(|source| CorpusError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_raw(&raw))
    }

    /// Normalized text with original casing.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// ASCII-folded text for case-insensitive search.
    pub fn folded(&self) -> &str {
        &self.folded
    }

    /// sha256 digest of the raw source text.
    pub fn source_digest(&self) -> &str {
        &self.source_digest
    }

    /// Original line range for the span at `[offset, offset + len)`.
    ///
    /// `len` must be nonzero and the span must lie inside the text; both
    /// hold for any span produced by searching `text` or `folded`.
    pub fn line_range(&self, offset: usize, len: usize) -> LineRange {
        LineRange {
            start: self.line_of[offset],
            end: self.line_of[offset + len - 1],
        }
    }
}

/// Per-run transcript cache, keyed by participant identifier.
///
/// Built fresh for each validation run and passed in explicitly, so runs
/// (and tests) never observe each other's corpora.
#[derive(Debug, Default)]
pub struct CorpusCache {
    corpora: HashMap<String, TranscriptCorpus>,
}

impl CorpusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of corpora built so far in this run.
    pub fn len(&self) -> usize {
        self.corpora.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpora.is_empty()
    }

    /// Return the cached corpus for a participant, loading it on first use.
    pub fn get_or_load(
        &mut self,
        participant_id: &str,
        path: &Path,
    ) -> Result<&TranscriptCorpus, CorpusError> {
        match self.corpora.entry(participant_id.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let corpus = TranscriptCorpus::load(path)?;
                debug!(
                    participant = %participant_id,
                    digest = %corpus.source_digest(),
                    "built transcript corpus"
                );
                Ok(entry.insert(corpus))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_attribution() {
        let corpus = TranscriptCorpus::from_raw("hello world");
        assert_eq!(corpus.text(), "hello world");
        assert_eq!(corpus.line_range(0, 5).to_string(), "1");
        assert_eq!(corpus.line_range(6, 5).to_string(), "1");
    }

    #[test]
    fn test_blank_lines_dropped() {
        let corpus = TranscriptCorpus::from_raw("first\n\n   \nsecond");
        assert_eq!(corpus.text(), "first second");
        // "first" on line 1, "second" on line 4
        assert_eq!(corpus.line_range(0, 5), LineRange { start: 1, end: 1 });
        assert_eq!(corpus.line_range(6, 6), LineRange { start: 4, end: 4 });
    }

    #[test]
    fn test_separator_attributed_to_second_line() {
        let corpus = TranscriptCorpus::from_raw("one\ntwo");
        // offsets: 0-2 "one" (line 1), 3 separator (line 2), 4-6 "two" (line 2)
        assert_eq!(corpus.line_range(3, 1), LineRange { start: 2, end: 2 });
        assert_eq!(corpus.line_range(0, 7), LineRange { start: 1, end: 2 });
    }

    #[test]
    fn test_multi_line_range_display() {
        let corpus = TranscriptCorpus::from_raw("alpha\nbeta\ngamma");
        let span = corpus.text().len();
        assert_eq!(corpus.line_range(0, span).to_string(), "1-3");
    }

    #[test]
    fn test_normalization_inside_lines() {
        let corpus = TranscriptCorpus::from_raw("it\u{2019}s   fine\nreally");
        assert_eq!(corpus.text(), "it's fine really");
    }

    #[test]
    fn test_folded_is_byte_parallel() {
        let corpus = TranscriptCorpus::from_raw("Caf\u{e9} TALK\nMore Text");
        assert_eq!(corpus.text().len(), corpus.folded().len());
        assert_eq!(corpus.folded(), "caf\u{e9} talk more text");
    }

    #[test]
    fn test_digest_is_stable() {
        let a = TranscriptCorpus::from_raw("same text");
        let b = TranscriptCorpus::from_raw("same text");
        assert_eq!(a.source_digest(), b.source_digest());
        assert!(a.source_digest().starts_with("sha256:"));
    }

    #[test]
    fn test_cache_loads_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p01.md");
        std::fs::write(&path, "some transcript text").unwrap();

        let mut cache = CorpusCache::new();
        cache.get_or_load("P01", &path).unwrap();
        assert_eq!(cache.len(), 1);

        // Second lookup hits the cache even if the file disappears.
        std::fs::remove_file(&path).unwrap();
        let corpus = cache.get_or_load("P01", &path).unwrap();
        assert_eq!(corpus.text(), "some transcript text");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_transcript() {
        let mut cache = CorpusCache::new();
        let err = cache
            .get_or_load("P99", Path::new("/nonexistent/p99.md"))
            .unwrap_err();
        assert!(matches!(err, CorpusError::Missing { .. }));
    }
}
