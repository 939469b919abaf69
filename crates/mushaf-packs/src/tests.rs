use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::time::timeout;

use mushaf_lexicon::{LexiconEntry, MeaningIndex};

use crate::fetcher::{PackDownload, PackFetcher};
use crate::manager::{BundledPacks, PackManager, PackState};
use crate::preference::{MemoryPreferences, PreferenceStore};
use crate::PackError;

/// Serves packs from memory, recording every fetch and its resume offset.
struct MockFetcher {
    packs: HashMap<String, String>,
    calls: AtomicUsize,
    offsets: std::sync::Mutex<Vec<u64>>,
    fail: bool,
    chunk_size: usize,
    chunk_delay: Option<Duration>,
}

impl MockFetcher {
    fn new(packs: HashMap<String, String>) -> Self {
        Self {
            packs,
            calls: AtomicUsize::new(0),
            offsets: std::sync::Mutex::new(Vec::new()),
            fail: false,
            chunk_size: usize::MAX,
            chunk_delay: None,
        }
    }

    fn failing() -> Self {
        let mut fetcher = Self::new(HashMap::new());
        fetcher.fail = true;
        fetcher
    }
}

#[async_trait]
impl PackFetcher for MockFetcher {
    async fn fetch(&self, language: &str, offset: u64) -> Result<PackDownload, PackError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.offsets.lock().unwrap().push(offset);

        if self.fail {
            return Err(PackError::Http(500));
        }
        let body = self
            .packs
            .get(language)
            .ok_or(PackError::Http(404))?
            .clone()
            .into_bytes();
        let total = body.len() as u64;
        let rest = body[offset as usize..].to_vec();

        let chunk_size = self.chunk_size.min(rest.len().max(1));
        let chunks: Vec<Vec<u8>> = rest.chunks(chunk_size).map(|c| c.to_vec()).collect();
        let delay = self.chunk_delay;
        let stream = futures_util::stream::iter(chunks)
            .then(move |chunk| async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                Ok(chunk)
            })
            .boxed();

        Ok(PackDownload {
            total_bytes: Some(total),
            offset,
            stream,
        })
    }
}

fn pack_json(entries: &[(&str, &str)]) -> String {
    let map: HashMap<&str, &str> = entries.iter().copied().collect();
    serde_json::to_string(&map).unwrap()
}

fn bundled() -> BundledPacks {
    BundledPacks {
        default_language: "en".to_string(),
        translations: HashMap::from([("1:1:1".to_string(), "In the name".to_string())]),
        transliterations: HashMap::from([("1:1:1".to_string(), "bismi".to_string())]),
    }
}

fn meanings() -> Arc<MeaningIndex> {
    Arc::new(MeaningIndex::from_entries(vec![LexiconEntry {
        surah_number: 1,
        surah_name: "Al-Fatihah".to_string(),
        verse: 1,
        phrase: "بسم".to_string(),
        gloss: "in the name of".to_string(),
    }]))
}

async fn manager_with(fetcher: MockFetcher, cache_dir: std::path::PathBuf) -> PackManager {
    PackManager::new(
        Arc::new(fetcher),
        Arc::new(MemoryPreferences::new()),
        meanings(),
        bundled(),
        cache_dir,
    )
    .await
}

#[tokio::test]
async fn bundled_language_serves_resident_pack() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager_with(MockFetcher::new(HashMap::new()), dir.path().into()).await;

    let translation = manager.translation_for(1, 1, 0, &["بسم"]).await;
    assert_eq!(translation.as_deref(), Some("In the name"));
    assert_eq!(manager.state_of("en").await, PackState::Resident);
}

#[tokio::test]
async fn lazy_pack_downloads_on_first_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let packs = HashMap::from([("ur".to_string(), pack_json(&[("1:1:1", "نام سے")]))]);
    let manager = manager_with(MockFetcher::new(packs), dir.path().into()).await;

    manager.select("ur").await;
    assert_eq!(manager.state_of("ur").await, PackState::NotLoaded);

    let translation = manager.translation_for(1, 1, 0, &["بسم"]).await;
    assert_eq!(translation.as_deref(), Some("نام سے"));
    assert_eq!(manager.state_of("ur").await, PackState::Loaded);
}

#[tokio::test]
async fn language_switch_never_bleeds_old_pack() {
    let dir = tempfile::tempdir().unwrap();
    let packs = HashMap::from([
        ("ur".to_string(), pack_json(&[("1:1:1", "urdu word")])),
        ("fr".to_string(), pack_json(&[("1:1:1", "french word")])),
    ]);
    let manager = manager_with(MockFetcher::new(packs), dir.path().into()).await;

    manager.select("ur").await;
    let first = manager.translation_for(1, 1, 0, &[]).await;
    assert_eq!(first.as_deref(), Some("urdu word"));

    manager.select("fr").await;
    assert_eq!(manager.state_of("ur").await, PackState::NotLoaded);
    let second = manager.translation_for(1, 1, 0, &[]).await;
    assert_eq!(second.as_deref(), Some("french word"));
}

#[tokio::test]
async fn concurrent_lookups_share_one_download() {
    let dir = tempfile::tempdir().unwrap();
    let packs = HashMap::from([("ur".to_string(), pack_json(&[("1:1:1", "نام سے")]))]);
    let mut fetcher = MockFetcher::new(packs);
    fetcher.chunk_size = 4;
    fetcher.chunk_delay = Some(Duration::from_millis(5));
    let fetcher = Arc::new(fetcher);

    let manager = PackManager::new(
        fetcher.clone(),
        Arc::new(MemoryPreferences::new()),
        meanings(),
        bundled(),
        dir.path().into(),
    )
    .await;

    let (a, b) = tokio::join!(manager.ensure_loaded("ur"), manager.ensure_loaded("ur"));
    assert!(a.is_ok() && b.is_ok());
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_download_falls_back_to_bundled() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager_with(MockFetcher::failing(), dir.path().into()).await;

    manager.select("ur").await;
    let translation = manager.translation_for(1, 1, 0, &[]).await;
    // Silent degradation: the bundled value, no error.
    assert_eq!(translation.as_deref(), Some("In the name"));
    assert_eq!(manager.state_of("ur").await, PackState::LoadFailed);
}

#[tokio::test]
async fn dictionary_mode_serves_phrase_gloss() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager_with(MockFetcher::new(HashMap::new()), dir.path().into()).await;

    manager.select("dictionary").await;
    let translation = manager.translation_for(1, 1, 0, &["بسم", "الله"]).await;
    assert_eq!(translation.as_deref(), Some("in the name of"));
}

#[tokio::test]
async fn resumes_from_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    let body = pack_json(&[("1:1:1", "نام سے"), ("1:1:2", "الله کے")]);
    let split = body.len() / 2;
    std::fs::write(dir.path().join("ur.json.part"), &body.as_bytes()[..split]).unwrap();

    let packs = HashMap::from([("ur".to_string(), body)]);
    let fetcher = Arc::new(MockFetcher::new(packs));
    let manager = PackManager::new(
        fetcher.clone(),
        Arc::new(MemoryPreferences::new()),
        meanings(),
        bundled(),
        dir.path().into(),
    )
    .await;

    let map = manager.ensure_loaded("ur").await.unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(*fetcher.offsets.lock().unwrap(), vec![split as u64]);
}

#[tokio::test]
async fn disk_cached_pack_skips_the_network() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("ur.json"),
        pack_json(&[("1:1:1", "نام سے")]),
    )
    .unwrap();

    let fetcher = Arc::new(MockFetcher::new(HashMap::new()));
    let manager = PackManager::new(
        fetcher.clone(),
        Arc::new(MemoryPreferences::new()),
        meanings(),
        bundled(),
        dir.path().into(),
    )
    .await;

    let map = manager.ensure_loaded("ur").await.unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn progress_is_monotone() {
    let dir = tempfile::tempdir().unwrap();
    let body = pack_json(&[("1:1:1", "a longer value so there are several chunks")]);
    let packs = HashMap::from([("ur".to_string(), body)]);
    let mut fetcher = MockFetcher::new(packs);
    fetcher.chunk_size = 8;
    fetcher.chunk_delay = Some(Duration::from_millis(5));
    let manager = manager_with(fetcher, dir.path().into()).await;

    let loader = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.ensure_loaded("ur").await })
    };

    // Attach to the in-flight download's progress channel.
    let mut progress = timeout(Duration::from_secs(2), async {
        loop {
            if let Some(rx) = manager.progress_of("ur").await {
                break rx;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("download finished before progress could be observed");

    let mut seen = vec![*progress.borrow()];
    while progress.changed().await.is_ok() {
        seen.push(*progress.borrow());
    }

    timeout(Duration::from_secs(2), loader)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "progress went backwards: {seen:?}");
    assert_eq!(*seen.last().unwrap(), 1.0);
}

#[tokio::test]
async fn clear_cache_forces_reload() {
    let dir = tempfile::tempdir().unwrap();
    let packs = HashMap::from([("ur".to_string(), pack_json(&[("1:1:1", "نام سے")]))]);
    let fetcher = Arc::new(MockFetcher::new(packs));
    let manager = PackManager::new(
        fetcher.clone(),
        Arc::new(MemoryPreferences::new()),
        meanings(),
        bundled(),
        dir.path().into(),
    )
    .await;

    manager.ensure_loaded("ur").await.unwrap();
    manager.clear_cache().await;
    assert_eq!(manager.state_of("ur").await, PackState::NotLoaded);

    // Reload comes from the disk cache, not memory.
    manager.ensure_loaded("ur").await.unwrap();
    assert_eq!(manager.state_of("ur").await, PackState::Loaded);
}

#[tokio::test]
async fn select_persists_the_preference() {
    let dir = tempfile::tempdir().unwrap();
    let preferences = Arc::new(MemoryPreferences::new());
    let manager = PackManager::new(
        Arc::new(MockFetcher::new(HashMap::new())),
        preferences.clone(),
        meanings(),
        bundled(),
        dir.path().into(),
    )
    .await;

    manager.select("ur").await;
    assert_eq!(preferences.active_language().await.as_deref(), Some("ur"));
    assert_eq!(manager.active_language().await, "ur");
}

#[tokio::test]
async fn transliteration_comes_from_resident_pack() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager_with(MockFetcher::new(HashMap::new()), dir.path().into()).await;

    assert_eq!(manager.transliteration_for(1, 1, 0).as_deref(), Some("bismi"));
    assert_eq!(manager.transliteration_for(9, 9, 0), None);
}
