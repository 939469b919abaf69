use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use mushaf_core::tokenize::split_words;
use mushaf_core::types::WordInfo;
use mushaf_geometry::{hit_test, CoordinateIndex};
use mushaf_lexicon::FrequencyTable;
use mushaf_packs::PackManager;

use crate::source::{PageViewport, VerseSource};

/// Composes the hit-tester, frequency table and pack manager into one
/// query per touch position.
///
/// Touch-move events can outrun the async lookups, so resolution follows a
/// last-request-wins discipline: every query takes a generation number, and
/// a result whose generation is no longer current when it completes is
/// discarded. A query for the same word as the previous one is a no-op, so
/// dragging across a word does not re-fire its lookups or its side effects.
pub struct WordResolver {
    coordinates: Arc<CoordinateIndex>,
    frequency: Arc<FrequencyTable>,
    packs: PackManager,
    verses: Arc<dyn VerseSource>,
    last_key: Mutex<Option<(u16, u16, usize)>>,
    generation: AtomicU64,
}

impl WordResolver {
    pub fn new(
        coordinates: Arc<CoordinateIndex>,
        frequency: Arc<FrequencyTable>,
        packs: PackManager,
        verses: Arc<dyn VerseSource>,
    ) -> Self {
        Self {
            coordinates,
            frequency,
            packs,
            verses,
            last_key: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Resolve a touch position to a described word.
    ///
    /// Returns `None` when nothing is under the touch, when the touched
    /// word is the one already resolved, or when the result went stale
    /// while its lookups ran. Lookup failures do not fail the query: the
    /// result carries whatever fields could be filled.
    pub async fn resolve(
        &self,
        viewport: PageViewport,
        screen_x: f32,
        screen_y: f32,
    ) -> Option<WordInfo> {
        let page_words = self.coordinates.page_words(viewport.page);
        let Some(hit) = hit_test(
            screen_x,
            screen_y,
            viewport.scale,
            viewport.content_offset_y,
            page_words,
        ) else {
            // Leaving all words re-arms the de-dup, so coming back to the
            // same word fires again. The miss also supersedes any lookup
            // still in flight: its result must not surface for a word no
            // longer under the touch point.
            self.generation.fetch_add(1, Ordering::SeqCst);
            *self.last_key.lock().await = None;
            return None;
        };

        let key = (hit.surah, hit.ayah, hit.word_index);
        {
            let mut last = self.last_key.lock().await;
            if *last == Some(key) {
                return None;
            }
            *last = Some(key);
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let mut info = WordInfo::new(hit.surah, hit.ayah, hit.word_index, screen_x, screen_y);
        info.bounds = Some(hit.bounds);
        info.transliteration = self
            .packs
            .transliteration_for(hit.surah, hit.ayah, hit.word_index);

        match self.verses.verse_text(hit.surah, hit.ayah).await {
            Some(verse) => {
                let tokens = split_words(&verse);
                info.arabic = tokens.get(hit.word_index).map(|t| (*t).to_string());
                if let Some(word) = &info.arabic {
                    info.frequency = Some(self.frequency.frequency_of(word));
                }
                info.translation = self
                    .packs
                    .translation_for(hit.surah, hit.ayah, hit.word_index, &tokens)
                    .await;
            }
            None => {
                tracing::debug!("No verse text for {}:{}", hit.surah, hit.ayah);
            }
        }

        // Last request wins: a newer query superseded this one while its
        // lookups ran.
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(
                "Discarding stale resolution for {}:{}:{}",
                hit.surah,
                hit.ayah,
                hit.word_index
            );
            return None;
        }

        Some(info)
    }

    /// Forwarded to the pack manager; hosts call this on language change.
    pub async fn clear_cache(&self) {
        self.packs.clear_cache().await;
    }
}
