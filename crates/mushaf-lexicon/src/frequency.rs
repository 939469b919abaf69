use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use mushaf_core::normalize::normalize;
use mushaf_core::tokenize::split_words;

use crate::LoadError;

/// One verse record of the corpus dataset fed to the offline builder.
#[derive(Debug, Clone, Deserialize)]
pub struct VerseRecord {
    pub surah: u16,
    pub ayah: u16,
    pub text: String,
}

/// Counters reported by a corpus build run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorpusStats {
    pub verses: usize,
    pub tokens: usize,
    pub skipped: usize,
}

/// Normalized token -> corpus-wide occurrence count. Absent keys count 0.
/// Read-only at runtime; produced offline by `freqgen`.
pub struct FrequencyTable {
    counts: HashMap<String, u32>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }

    /// Load a previously generated table (a JSON object of token -> count).
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let counts: HashMap<String, u32> = serde_json::from_str(json)?;
        Ok(Self { counts })
    }

    pub fn load_from_file(path: &Path) -> Result<Self, LoadError> {
        tracing::info!("Loading frequency table from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        let table = Self::from_json(&json)?;
        tracing::info!("Loaded {} frequency entries", table.counts.len());
        Ok(table)
    }

    /// Build the table from a corpus dataset (a JSON array of verse
    /// records). A record that fails to parse is skipped and counted, not
    /// fatal: one bad row must not sink the whole run.
    pub fn build_from_corpus(json: &str) -> Result<(Self, CorpusStats), LoadError> {
        let rows: Vec<serde_json::Value> = serde_json::from_str(json)?;

        let mut table = Self::new();
        let mut stats = CorpusStats::default();

        for row in rows {
            let record: VerseRecord = match serde_json::from_value(row) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("Skipping malformed corpus record: {}", e);
                    stats.skipped += 1;
                    continue;
                }
            };
            stats.verses += 1;
            for token in split_words(&record.text) {
                let key = normalize(token);
                if key.is_empty() {
                    continue;
                }
                *table.counts.entry(key).or_insert(0) += 1;
                stats.tokens += 1;
            }
        }

        Ok((table, stats))
    }

    /// Occurrence count for a token, 0 when unseen.
    pub fn frequency_of(&self, token: &str) -> u32 {
        self.counts.get(&normalize(token)).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Serialize for the generated artifact.
    pub fn to_json(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string_pretty(&self.counts)?)
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}
