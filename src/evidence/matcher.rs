//! Quote matching against a line-indexed corpus.
//!
//! A quotation either matches as one contiguous case-insensitive substring,
//! or — when it contains an elision marker (`...`) — as an ordered sequence
//! of segments, each found strictly after the end of the previous segment's
//! match. The ordered-cursor rule rejects quotations whose fragments all
//! occur somewhere in the transcript but in a misleading order.

use thiserror::Error;

use super::corpus::{LineRange, TranscriptCorpus};
use super::normalize::{fold, normalize};

/// Elision marker inside a quotation: three consecutive dots.
pub const ELLIPSIS: &str = "...";

/// How much of a missing segment to echo back in the failure reason.
const SEGMENT_PREVIEW_CHARS: usize = 60;

/// Why a quotation could not be verified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchFailure {
    #[error("Quote not found in transcript")]
    QuoteNotFound,

    #[error("Segment not found: \"{preview}\"")]
    SegmentNotFound { preview: String },

    #[error("Quote contains only ellipses")]
    EmptyQuote,
}

/// A verified quotation: what the transcript actually says, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteMatch {
    /// Verbatim matched text with corpus casing; elided segments joined
    /// with a visible ` ... ` marker.
    pub text: String,
    /// One line range per matched segment, in transcript order.
    pub line_ranges: Vec<LineRange>,
}

impl QuoteMatch {
    /// Line ranges rendered as the report expects: `12` or `3-4, 12`.
    pub fn lines_display(&self) -> String {
        self.line_ranges
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Verify a claimed quotation against a corpus.
///
/// Matching is case-insensitive; the returned text preserves the corpus
/// casing, not the claim's.
pub fn match_quote(corpus: &TranscriptCorpus, quote: &str) -> Result<QuoteMatch, MatchFailure> {
    let norm_quote = normalize(quote);

    if !norm_quote.contains(ELLIPSIS) {
        return match_plain(corpus, &norm_quote);
    }
    match_segmented(corpus, &norm_quote)
}

fn match_plain(corpus: &TranscriptCorpus, norm_quote: &str) -> Result<QuoteMatch, MatchFailure> {
    if norm_quote.is_empty() {
        return Err(MatchFailure::QuoteNotFound);
    }
    let needle = fold(norm_quote);
    let idx = corpus
        .folded()
        .find(&needle)
        .ok_or(MatchFailure::QuoteNotFound)?;

    Ok(QuoteMatch {
        text: corpus.text()[idx..idx + needle.len()].to_string(),
        line_ranges: vec![corpus.line_range(idx, needle.len())],
    })
}

fn match_segmented(
    corpus: &TranscriptCorpus,
    norm_quote: &str,
) -> Result<QuoteMatch, MatchFailure> {
    let segments: Vec<String> = norm_quote
        .split(ELLIPSIS)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if segments.is_empty() {
        return Err(MatchFailure::EmptyQuote);
    }

    let mut matched: Vec<&str> = Vec::with_capacity(segments.len());
    let mut line_ranges = Vec::with_capacity(segments.len());
    let mut cursor = 0usize;

    for segment in &segments {
        let needle = fold(segment);
        let idx = corpus.folded()[cursor..]
            .find(&needle)
            .map(|rel| cursor + rel)
            .ok_or_else(|| MatchFailure::SegmentNotFound {
                preview: preview(segment),
            })?;

        matched.push(&corpus.text()[idx..idx + needle.len()]);
        line_ranges.push(corpus.line_range(idx, needle.len()));
        cursor = idx + needle.len();
    }

    Ok(QuoteMatch {
        text: matched.join(" ... "),
        line_ranges,
    })
}

/// First ~60 characters of a segment, for failure diagnostics.
fn preview(segment: &str) -> String {
    if segment.chars().count() <= SEGMENT_PREVIEW_CHARS {
        return segment.to_string();
    }
    let cut: String = segment.chars().take(SEGMENT_PREVIEW_CHARS).collect();
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(raw: &str) -> TranscriptCorpus {
        TranscriptCorpus::from_raw(raw)
    }

    #[test]
    fn test_plain_match() {
        let c = corpus("The onboarding took three weeks to complete.");
        let m = match_quote(&c, "took three weeks").unwrap();
        assert_eq!(m.text, "took three weeks");
        assert_eq!(m.lines_display(), "1");
    }

    #[test]
    fn test_case_insensitive_preserves_corpus_casing() {
        let c = corpus("We NEVER saw the error again.");
        let m = match_quote(&c, "we never saw").unwrap();
        assert_eq!(m.text, "We NEVER saw");
    }

    #[test]
    fn test_plain_not_found() {
        let c = corpus("Nothing relevant here.");
        assert_eq!(
            match_quote(&c, "completely absent").unwrap_err(),
            MatchFailure::QuoteNotFound
        );
    }

    #[test]
    fn test_curly_quotes_in_claim() {
        let c = corpus("I said it's broken and moved on.");
        let m = match_quote(&c, "it\u{2019}s broken").unwrap();
        assert_eq!(m.text, "it's broken");
    }

    #[test]
    fn test_match_across_lines() {
        let c = corpus("end of one thought\nstart of the next");
        let m = match_quote(&c, "thought start").unwrap();
        assert_eq!(m.lines_display(), "1-2");
    }

    // The concrete acceptance scenario: line 12 holds the quoted sentence.
    #[test]
    fn test_elided_quote_on_line_12() {
        let mut raw = String::new();
        for i in 1..=11 {
            raw.push_str(&format!("filler line {}\n", i));
        }
        raw.push_str("\"I was frustrated by the onboarding flow.\"\n");
        let c = corpus(&raw);

        let m = match_quote(&c, "I was frustrated ... onboarding flow").unwrap();
        assert_eq!(m.text, "I was frustrated ... onboarding flow");
        assert_eq!(m.lines_display(), "12, 12");

        let err = match_quote(&c, "onboarding flow ... frustrated").unwrap_err();
        assert!(matches!(err, MatchFailure::SegmentNotFound { .. }));
    }

    #[test]
    fn test_segments_must_be_ordered() {
        let c = corpus("alpha comes first and beta comes later");
        assert!(match_quote(&c, "alpha ... beta").is_ok());
        let err = match_quote(&c, "beta ... alpha").unwrap_err();
        assert_eq!(
            err,
            MatchFailure::SegmentNotFound {
                preview: "alpha".to_string()
            }
        );
    }

    #[test]
    fn test_segments_may_not_overlap() {
        // Both segments exist, but the second only at an offset before the
        // first match ends.
        let c = corpus("shared words here");
        let err = match_quote(&c, "shared words ... words here").unwrap_err();
        assert!(matches!(err, MatchFailure::SegmentNotFound { .. }));
    }

    #[test]
    fn test_repeated_text_allows_forward_rematch() {
        let c = corpus("we tried again and we tried again");
        let m = match_quote(&c, "we tried ... we tried").unwrap();
        assert_eq!(m.text, "we tried ... we tried");
    }

    #[test]
    fn test_ellipsis_only_quote() {
        let c = corpus("anything at all");
        assert_eq!(
            match_quote(&c, "... ... ...").unwrap_err(),
            MatchFailure::EmptyQuote
        );
    }

    #[test]
    fn test_segment_preview_truncated() {
        let c = corpus("short transcript");
        let long_segment = "x".repeat(100);
        let claim = format!("short ... {}", long_segment);
        match match_quote(&c, &claim).unwrap_err() {
            MatchFailure::SegmentNotFound { preview } => {
                assert_eq!(preview, format!("{}...", "x".repeat(60)));
            }
            other => panic!("expected SegmentNotFound, got {:?}", other),
        }
    }

    // Every non-blank substring of the normalized text is itself a valid
    // verbatim quote.
    #[test]
    fn test_every_normalized_substring_matches() {
        let c = corpus("alpha beta\ngamma delta");
        let text = c.text().to_string();
        for start in 0..text.len() {
            for end in (start + 1)..=text.len() {
                let claim = &text[start..end];
                if normalize(claim).is_empty() {
                    continue;
                }
                let m = match_quote(&c, claim)
                    .unwrap_or_else(|e| panic!("substring {:?} failed: {}", claim, e));
                assert_eq!(fold(&m.text), fold(&normalize(claim)));
            }
        }
    }

    #[test]
    fn test_segment_line_ranges_reported_per_segment() {
        let c = corpus("first thing said\nirrelevant middle\nlast thing said");
        let m = match_quote(&c, "first thing ... last thing").unwrap();
        assert_eq!(m.lines_display(), "1, 3");
    }
}
