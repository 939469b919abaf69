use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use mushaf_core::tokenize::split_words;
use mushaf_core::types::VerseKey;

/// One calibration record as stored in the geometry artifact. The artifact
/// is ordered by reading order across the whole book; word indices are not
/// stored, they are derived at load time.
#[derive(Debug, Clone, Deserialize)]
pub struct WordCoordinate {
    pub page: u16,
    pub surah: u16,
    pub ayah: u16,
    pub line: u8,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A word box with its derived position within the verse.
#[derive(Debug, Clone)]
pub struct PageWord {
    pub surah: u16,
    pub ayah: u16,
    pub word_index: usize,
    pub line: u8,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Immutable per-page index over the word boxes. Built once, shared for
/// concurrent reads.
pub struct CoordinateIndex {
    pages: HashMap<u16, Vec<PageWord>>,
    verse_counts: HashMap<VerseKey, usize>,
}

impl CoordinateIndex {
    /// Build the index, assigning each record a 0-based word index by
    /// counting earlier records of the same verse in storage order. Verses
    /// that span a page break keep a continuous index this way.
    pub fn from_entries(entries: Vec<WordCoordinate>) -> Self {
        let mut pages: HashMap<u16, Vec<PageWord>> = HashMap::new();
        let mut verse_counts: HashMap<VerseKey, usize> = HashMap::new();

        for entry in entries {
            let key = VerseKey::new(entry.surah, entry.ayah);
            let count = verse_counts.entry(key).or_insert(0);
            let word_index = *count;
            *count += 1;

            pages.entry(entry.page).or_default().push(PageWord {
                surah: entry.surah,
                ayah: entry.ayah,
                word_index,
                line: entry.line,
                x: entry.x,
                y: entry.y,
                width: entry.width,
                height: entry.height,
            });
        }

        Self {
            pages,
            verse_counts,
        }
    }

    /// Parse the calibration artifact (a JSON array of records).
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        let entries: Vec<WordCoordinate> = serde_json::from_str(json)?;
        Ok(Self::from_entries(entries))
    }

    pub fn load_from_file(path: &Path) -> Result<Self, DatasetError> {
        tracing::info!("Loading word coordinates from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        let index = Self::from_json(&json)?;
        tracing::info!(
            "Loaded word boxes for {} pages ({} verses)",
            index.pages.len(),
            index.verse_counts.len()
        );
        Ok(index)
    }

    /// Word boxes for one page, in storage (reading) order.
    pub fn page_words(&self, page: u16) -> &[PageWord] {
        self.pages.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of word boxes recorded for a verse.
    pub fn verse_word_count(&self, key: VerseKey) -> usize {
        self.verse_counts.get(&key).copied().unwrap_or(0)
    }

    /// Check the coordinate/tokenizer alignment invariant: for every verse
    /// the box count must equal the shared-tokenizer token count of the
    /// canonical text. Returns the keys that do not line up.
    pub fn verify_alignment<F>(&self, verse_text: F) -> Vec<VerseKey>
    where
        F: Fn(VerseKey) -> Option<String>,
    {
        let mut misaligned = Vec::new();
        for (&key, &count) in &self.verse_counts {
            let Some(text) = verse_text(key) else {
                continue;
            };
            if split_words(&text).len() != count {
                misaligned.push(key);
            }
        }
        misaligned.sort_by_key(|k| (k.surah, k.ayah));
        misaligned
    }
}
