use unicode_normalization::UnicodeNormalization;

/// Canonicalize Arabic text for lookups.
///
/// Strips tashkeel, small Quranic annotation marks, tatweel, stand-alone
/// recitation symbols and invisible formatting characters, then unifies
/// the letter variants that differ between the Uthmani script and plain
/// dictionary spellings. Idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    // NFC first so decomposed sequences (alef + combining madda, etc.)
    // hit the single-codepoint rules below.
    for ch in text.nfc() {
        if is_tashkeel(ch) || is_annotation_mark(ch) || is_recitation_symbol(ch) {
            continue;
        }
        if ch == TATWEEL || is_invisible(ch) {
            continue;
        }

        match ch {
            // Alef with madda / hamza above / hamza below / wasla
            '\u{0622}' | '\u{0623}' | '\u{0625}' | '\u{0671}' => result.push('\u{0627}'),
            // Teh marbuta -> heh
            '\u{0629}' => result.push('\u{0647}'),
            // Alef maksura and Farsi yeh -> yeh
            '\u{0649}' | '\u{06CC}' => result.push('\u{064A}'),
            // Waw with hamza -> waw
            '\u{0624}' => result.push('\u{0648}'),
            // Yeh with hamza -> yeh
            '\u{0626}' => result.push('\u{064A}'),
            _ => result.push(ch),
        }
    }

    // Collapse whitespace runs and trim.
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

const TATWEEL: char = '\u{0640}';

/// Combining diacritical marks: fathatan through sukun, madda/hamza
/// combiners, and the superscript alef used in Uthmani orthography.
fn is_tashkeel(ch: char) -> bool {
    matches!(ch, '\u{064B}'..='\u{065F}' | '\u{0670}')
}

/// Small combining marks from the Quranic annotation block and the
/// extended Arabic mark block.
fn is_annotation_mark(ch: char) -> bool {
    matches!(ch,
        '\u{06D6}'..='\u{06DC}' |
        '\u{06DF}'..='\u{06E8}' |
        '\u{06EA}'..='\u{06ED}' |
        '\u{08D4}'..='\u{08FF}'
    )
}

/// Stand-alone recitation glyphs: end of ayah, rub el hizb, sajdah.
fn is_recitation_symbol(ch: char) -> bool {
    matches!(ch, '\u{06DD}' | '\u{06DE}' | '\u{06E9}')
}

/// Zero-width and bidi control characters that leak out of shaped text.
fn is_invisible(ch: char) -> bool {
    matches!(ch,
        '\u{200B}'..='\u{200F}' |
        '\u{202A}'..='\u{202E}' |
        '\u{2060}' |
        '\u{2066}'..='\u{2069}' |
        '\u{FEFF}'
    )
}
