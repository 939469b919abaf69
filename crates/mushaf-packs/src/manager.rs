use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

use mushaf_lexicon::MeaningIndex;

use crate::fetcher::PackFetcher;
use crate::preference::PreferenceStore;
use crate::source::TranslationSource;
use crate::PackError;

type PackMap = HashMap<String, String>;

/// Resident data shipped with the app: the default-language translations
/// and the transliterations, both keyed "surah:ayah:word" (1-based word).
pub struct BundledPacks {
    pub default_language: String,
    pub translations: PackMap,
    pub transliterations: PackMap,
}

/// Snapshot of one language's cache slot.
#[derive(Debug, Clone, PartialEq)]
pub enum PackState {
    Resident,
    NotLoaded,
    Loading(f32),
    Loaded,
    LoadFailed,
}

enum PackSlot {
    Loading {
        // Ties the slot to one download task, so a task finishing after its
        // slot was cleared cannot touch a successor's slot.
        id: u64,
        progress: watch::Receiver<f32>,
        cancel: CancellationToken,
    },
    Loaded(Arc<PackMap>),
    Failed,
}

struct ManagerState {
    active: TranslationSource,
    packs: HashMap<String, PackSlot>,
}

struct Inner {
    fetcher: Arc<dyn PackFetcher>,
    preferences: Arc<dyn PreferenceStore>,
    meanings: Arc<MeaningIndex>,
    bundled: BundledPacks,
    cache_dir: PathBuf,
    state: Mutex<ManagerState>,
    download_seq: std::sync::atomic::AtomicU64,
}

/// Per-language translation cache with lazy, cancellable, resumable
/// loading.
///
/// One instance owns all pack state (active source, loaded maps, in-flight
/// downloads); consumers hold a clone and go through it for every lookup
/// instead of retaining pack references. At most one download per language
/// is in flight; a second request attaches to the running one. A failed
/// pack degrades lookups to the bundled default language without surfacing
/// an error to the touch path.
#[derive(Clone)]
pub struct PackManager {
    inner: Arc<Inner>,
}

impl PackManager {
    /// Build the manager and restore the persisted language selection.
    pub async fn new(
        fetcher: Arc<dyn PackFetcher>,
        preferences: Arc<dyn PreferenceStore>,
        meanings: Arc<MeaningIndex>,
        bundled: BundledPacks,
        cache_dir: PathBuf,
    ) -> Self {
        let active = match preferences.active_language().await {
            Some(id) => TranslationSource::from_language_id(&id, &bundled.default_language),
            None => TranslationSource::Bundled,
        };

        Self {
            inner: Arc::new(Inner {
                fetcher,
                preferences,
                meanings,
                bundled,
                cache_dir,
                state: Mutex::new(ManagerState {
                    active,
                    packs: HashMap::new(),
                }),
                download_seq: std::sync::atomic::AtomicU64::new(0),
            }),
        }
    }

    /// Currently selected language id.
    pub async fn active_language(&self) -> String {
        let state = self.inner.state.lock().await;
        state
            .active
            .language_id(&self.inner.bundled.default_language)
            .to_string()
    }

    /// Switch the active language. Cached packs are cleared wholesale so no
    /// lookup can mix results from the previous language, and in-flight
    /// downloads are cancelled. The choice is persisted.
    pub async fn select(&self, language_id: &str) {
        let source =
            TranslationSource::from_language_id(language_id, &self.inner.bundled.default_language);
        {
            let mut state = self.inner.state.lock().await;
            state.active = source;
            clear_slots(&mut state);
        }
        self.inner.preferences.set_active_language(language_id).await;
        tracing::info!("Active translation source set to {}", language_id);
    }

    /// Drop all cached packs; the next lookup reloads.
    pub async fn clear_cache(&self) {
        let mut state = self.inner.state.lock().await;
        clear_slots(&mut state);
    }

    /// Translation for a word under the active source. `verse_tokens` feeds
    /// the phrase matcher when the dictionary-gloss mode is selected.
    pub async fn translation_for(
        &self,
        surah: u16,
        ayah: u16,
        word_index: usize,
        verse_tokens: &[&str],
    ) -> Option<String> {
        let source = {
            let state = self.inner.state.lock().await;
            state.active.clone()
        };

        let key = pack_key(surah, ayah, word_index);
        match source {
            TranslationSource::Bundled => self.inner.bundled.translations.get(&key).cloned(),
            TranslationSource::PhraseDictionary => self
                .inner
                .meanings
                .find_gloss(surah, ayah, word_index, verse_tokens)
                .map(|entry| entry.gloss.clone()),
            TranslationSource::Lazy(language) => match self.ensure_loaded(&language).await {
                Ok(map) => map.get(&key).cloned(),
                Err(e) => {
                    tracing::warn!(
                        "Pack {} unavailable ({}), falling back to bundled {}",
                        language,
                        e,
                        self.inner.bundled.default_language
                    );
                    self.inner.bundled.translations.get(&key).cloned()
                }
            },
        }
    }

    /// Transliteration from the resident pack.
    pub fn transliteration_for(&self, surah: u16, ayah: u16, word_index: usize) -> Option<String> {
        self.inner
            .bundled
            .transliterations
            .get(&pack_key(surah, ayah, word_index))
            .cloned()
    }

    /// Get a language's pack, downloading it if needed. Concurrent callers
    /// for the same language attach to the single in-flight download.
    pub async fn ensure_loaded(&self, language: &str) -> Result<Arc<PackMap>, PackError> {
        loop {
            let mut progress = {
                let mut state = self.inner.state.lock().await;
                match state.packs.get(language) {
                    Some(PackSlot::Loaded(map)) => return Ok(map.clone()),
                    Some(PackSlot::Failed) => return Err(PackError::LoadFailed),
                    Some(PackSlot::Loading { progress, .. }) => progress.clone(),
                    None => {
                        let (tx, rx) = watch::channel(0.0f32);
                        let cancel = CancellationToken::new();
                        let id = self
                            .inner
                            .download_seq
                            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                        state.packs.insert(
                            language.to_string(),
                            PackSlot::Loading {
                                id,
                                progress: rx.clone(),
                                cancel: cancel.clone(),
                            },
                        );
                        let inner = self.inner.clone();
                        let language = language.to_string();
                        tokio::spawn(run_download(inner, language, id, tx, cancel));
                        rx
                    }
                }
            };

            // The sender is dropped when the download task finishes;
            // re-read the slot then.
            while progress.changed().await.is_ok() {}
        }
    }

    /// Cache state for one language.
    pub async fn state_of(&self, language: &str) -> PackState {
        if language == self.inner.bundled.default_language {
            return PackState::Resident;
        }
        let state = self.inner.state.lock().await;
        match state.packs.get(language) {
            None => PackState::NotLoaded,
            Some(PackSlot::Loading { progress, .. }) => PackState::Loading(*progress.borrow()),
            Some(PackSlot::Loaded(_)) => PackState::Loaded,
            Some(PackSlot::Failed) => PackState::LoadFailed,
        }
    }

    /// Progress channel of an in-flight download, for observers.
    pub async fn progress_of(&self, language: &str) -> Option<watch::Receiver<f32>> {
        let state = self.inner.state.lock().await;
        match state.packs.get(language) {
            Some(PackSlot::Loading { progress, .. }) => Some(progress.clone()),
            _ => None,
        }
    }
}

fn pack_key(surah: u16, ayah: u16, word_index: usize) -> String {
    // Pack data uses 1-based word positions.
    format!("{}:{}:{}", surah, ayah, word_index + 1)
}

fn clear_slots(state: &mut ManagerState) {
    for slot in state.packs.values() {
        if let PackSlot::Loading { cancel, .. } = slot {
            cancel.cancel();
        }
    }
    state.packs.clear();
}

async fn run_download(
    inner: Arc<Inner>,
    language: String,
    id: u64,
    progress: watch::Sender<f32>,
    cancel: CancellationToken,
) {
    let result = download_pack(
        &*inner.fetcher,
        &inner.cache_dir,
        &language,
        &progress,
        &cancel,
    )
    .await;

    let mut state = inner.state.lock().await;
    // The slot is gone or replaced when the language changed mid-download;
    // that result is stale and dropped.
    if !matches!(
        state.packs.get(&language),
        Some(PackSlot::Loading { id: slot_id, .. }) if *slot_id == id
    ) {
        return;
    }
    match result {
        Ok(map) => {
            tracing::info!("Loaded translation pack {} ({} words)", language, map.len());
            state
                .packs
                .insert(language, PackSlot::Loaded(Arc::new(map)));
        }
        Err(PackError::Cancelled) => {
            tracing::debug!("Download of pack {} cancelled", language);
            state.packs.remove(&language);
        }
        Err(e) => {
            tracing::warn!("Failed to load translation pack {}: {}", language, e);
            state.packs.insert(language, PackSlot::Failed);
        }
    }
}

async fn download_pack(
    fetcher: &dyn PackFetcher,
    cache_dir: &Path,
    language: &str,
    progress: &watch::Sender<f32>,
    cancel: &CancellationToken,
) -> Result<PackMap, PackError> {
    std::fs::create_dir_all(cache_dir)?;

    let final_path = cache_dir.join(format!("{language}.json"));
    if final_path.exists() {
        let json = std::fs::read_to_string(&final_path)?;
        let map: PackMap = serde_json::from_str(&json)?;
        let _ = progress.send(1.0);
        return Ok(map);
    }

    // Resume from whatever an earlier interrupted download left behind.
    let part_path = cache_dir.join(format!("{language}.json.part"));
    let resume_from = std::fs::metadata(&part_path).map(|m| m.len()).unwrap_or(0);

    let download = fetcher.fetch(language, resume_from).await?;
    let mut file = if download.offset > 0 {
        std::fs::OpenOptions::new().append(true).open(&part_path)?
    } else {
        std::fs::File::create(&part_path)?
    };

    let mut stream = download.stream;
    let mut received = download.offset;
    loop {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => return Err(PackError::Cancelled),
            chunk = stream.next() => chunk,
        };
        let Some(chunk) = chunk else { break };
        let chunk = chunk?;
        file.write_all(&chunk)?;
        received += chunk.len() as u64;

        if let Some(total) = download.total_bytes.filter(|t| *t > 0) {
            let fraction = (received as f32 / total as f32).min(1.0);
            // Progress never goes backwards, whatever chunk sizes arrive.
            progress.send_if_modified(|current| {
                if fraction > *current {
                    *current = fraction;
                    true
                } else {
                    false
                }
            });
        }
    }
    file.flush()?;
    drop(file);

    std::fs::rename(&part_path, &final_path)?;
    let json = std::fs::read_to_string(&final_path)?;
    let map: PackMap = serde_json::from_str(&json)?;
    let _ = progress.send(1.0);
    Ok(map)
}
