//! Title comparison between the bibliography and the citation index.
//!
//! The two sources spell the same title with different character sets and
//! truncate subtitles differently, so titles are compared in a plain ASCII,
//! lower-case form and only over the first half of the query.

use deunicode::deunicode;
use unicode_normalization::UnicodeNormalization;

/// Lower-case, ASCII-only form of a title.
pub fn comparable_title(title: &str) -> String {
    plain_ascii(title).trim().to_lowercase()
}

/// ASCII transliteration of `text` (`Ł` becomes `L`, `ß` becomes `ss`).
///
/// Input is composed (NFC) first so letters followed by combining marks
/// transliterate like their precomposed forms.
pub fn plain_ascii(text: &str) -> String {
    let composed: String = text.nfc().collect();
    deunicode(&composed)
}

/// Half-prefix match of two comparable titles.
///
/// The first `len(query) / 2` characters of both titles must be equal. A
/// candidate shorter than that never matches.
pub fn half_prefix_match(query: &str, candidate: &str) -> bool {
    let half = query.chars().count() / 2;
    let mut candidate_chars = candidate.chars();
    query
        .chars()
        .take(half)
        .all(|q| candidate_chars.next() == Some(q))
}
