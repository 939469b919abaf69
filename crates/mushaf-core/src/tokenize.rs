//! Verse tokenization shared by every word-indexed dataset.
//!
//! The word coordinates, the translation pack keys and the runtime resolver
//! all identify a word by its position in the sequence this function
//! produces. Changing the split or the marker filter here silently shifts
//! word indices against data generated under the old rule, so the three
//! datasets and this function must move together.

/// Split a verse into its word tokens.
///
/// Splits on whitespace, then drops tokens that are pure pause/stop glyphs
/// and single-character tokens from the Quranic annotation and extended
/// Arabic mark ranges. Deterministic; byte slices borrow from the input.
pub fn split_words(verse: &str) -> Vec<&str> {
    verse
        .split_whitespace()
        .filter(|token| !is_marker_token(token))
        .collect()
}

/// Pause and recitation glyphs that appear as free-standing "words" in the
/// Uthmani text. Closed set.
const STOP_SIGNS: &[char] = &[
    '\u{06D6}', // sala
    '\u{06D7}', // qala
    '\u{06D8}', // meem
    '\u{06D9}', // lam alef
    '\u{06DA}', // jeem
    '\u{06DB}', // three dots
    '\u{06DC}', // seen
    '\u{06DD}', // end of ayah
    '\u{06DE}', // rub el hizb
    '\u{06E9}', // sajdah
];

fn is_marker_token(token: &str) -> bool {
    if token.chars().all(|ch| STOP_SIGNS.contains(&ch)) {
        return true;
    }
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => is_annotation_range(ch),
        _ => false,
    }
}

fn is_annotation_range(ch: char) -> bool {
    matches!(ch, '\u{06D6}'..='\u{06ED}' | '\u{08D4}'..='\u{08FF}')
}
