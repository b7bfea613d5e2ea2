//! Text normalization for quote matching.
//!
//! All matching runs over canonicalized text: whitespace runs collapsed to a
//! single space, ends trimmed, and typographic quote/apostrophe variants
//! mapped to their ASCII equivalents. Normalization preserves case; folding
//! happens only at comparison time so matched text keeps the corpus casing.

/// Map typographic quotation marks and apostrophes to ASCII.
///
/// Covers the left/right single and double curly quotes plus the prime
/// character, which transcription tools sometimes emit as an apostrophe.
pub fn normalize_marks(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{2032}' => '\'',
            '\u{201c}' | '\u{201d}' => '"',
            other => other,
        })
        .collect()
}

/// Canonicalize text for substring search.
///
/// Collapses every whitespace run to one space, trims the ends, and maps
/// typographic marks to ASCII. Pure and total; idempotent.
pub fn normalize(text: &str) -> String {
    normalize_marks(text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// ASCII case folding for comparison.
///
/// Byte-length preserving, which keeps folded text exactly parallel to the
/// per-byte offset-to-line index in the corpus.
pub fn fold(text: &str) -> String {
    text.to_ascii_lowercase()
}
