use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use mushaf_core::normalize::normalize;
use mushaf_core::types::VerseKey;

use crate::LoadError;

/// One rare-word dictionary entry. `phrase` may span several words of the
/// verse it annotates.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexiconEntry {
    pub surah_number: u16,
    pub surah_name: String,
    pub verse: u16,
    pub phrase: String,
    pub gloss: String,
}

/// Verse-keyed view over the lexicon. Entry order within a verse follows
/// dataset order and is the tie-break order for matching.
pub struct MeaningIndex {
    by_verse: HashMap<VerseKey, Vec<LexiconEntry>>,
}

impl MeaningIndex {
    pub fn from_entries(entries: Vec<LexiconEntry>) -> Self {
        let mut by_verse: HashMap<VerseKey, Vec<LexiconEntry>> = HashMap::new();
        for entry in entries {
            let key = VerseKey::new(entry.surah_number, entry.verse);
            by_verse.entry(key).or_default().push(entry);
        }
        Self { by_verse }
    }

    /// Parse the lexicon dataset (a JSON array of entries).
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let entries: Vec<LexiconEntry> = serde_json::from_str(json)?;
        Ok(Self::from_entries(entries))
    }

    pub fn load_from_file(path: &Path) -> Result<Self, LoadError> {
        tracing::info!("Loading lexicon from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        let index = Self::from_json(&json)?;
        tracing::info!("Loaded lexicon entries for {} verses", index.by_verse.len());
        Ok(index)
    }

    /// All entries for one verse, in dataset order.
    pub fn entries_for(&self, key: VerseKey) -> &[LexiconEntry] {
        self.by_verse.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve the tapped word against this verse's entries.
    ///
    /// Single-word phrases match when the normalized forms are equal or one
    /// contains the other. Multi-word phrases are tested against every
    /// contiguous token window that could place the tapped word at any
    /// position inside the phrase, comparing the joined normalized window
    /// against the normalized phrase the same loose way. The first entry
    /// that matches wins; entries are not ranked. The containment rule can
    /// over-match on short tokens — that looseness is intentional and
    /// pinned by tests, not something to tighten here.
    pub fn find_gloss(
        &self,
        surah: u16,
        ayah: u16,
        word_index: usize,
        verse_tokens: &[&str],
    ) -> Option<&LexiconEntry> {
        let entries = self.by_verse.get(&VerseKey::new(surah, ayah))?;
        let tapped = normalize(verse_tokens.get(word_index)?);
        if tapped.is_empty() {
            return None;
        }

        for entry in entries {
            let phrase = normalize(&entry.phrase);
            let phrase_len = phrase.split_whitespace().count();

            if phrase_len <= 1 {
                if loosely_matches(&phrase, &tapped) {
                    return Some(entry);
                }
                continue;
            }

            for i in 0..phrase_len {
                let Some(start) = word_index.checked_sub(i) else {
                    break;
                };
                let end = start + phrase_len;
                if end > verse_tokens.len() {
                    continue;
                }
                let window = verse_tokens[start..end]
                    .iter()
                    .map(|t| normalize(t))
                    .collect::<Vec<_>>()
                    .join(" ");
                if loosely_matches(&phrase, &window) {
                    return Some(entry);
                }
            }
        }

        None
    }
}

/// Equality or substring containment in either direction.
fn loosely_matches(a: &str, b: &str) -> bool {
    a == b || a.contains(b) || b.contains(a)
}
