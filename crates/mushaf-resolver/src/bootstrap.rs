use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use mushaf_config::Config;
use mushaf_geometry::CoordinateIndex;
use mushaf_lexicon::{FrequencyTable, MeaningIndex};
use mushaf_packs::{BundledPacks, HttpFetcher, PackManager, PreferenceStore};

use crate::resolver::WordResolver;
use crate::source::VerseSource;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Geometry dataset: {0}")]
    Geometry(#[from] mushaf_geometry::DatasetError),

    #[error("Lexicon dataset: {0}")]
    Lexicon(#[from] mushaf_lexicon::LoadError),

    #[error("Pack setup: {0}")]
    Packs(#[from] mushaf_packs::PackError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Wire a resolver from configuration: load the static datasets, stand up
/// the pack manager, restore the persisted language selection.
pub async fn build_resolver(
    config: &Config,
    verses: Arc<dyn VerseSource>,
    preferences: Arc<dyn PreferenceStore>,
) -> Result<WordResolver, BootstrapError> {
    let coordinates = Arc::new(CoordinateIndex::load_from_file(&config.data.coordinates_file)?);
    let meanings = Arc::new(MeaningIndex::load_from_file(&config.data.lexicon_file)?);
    let frequency = Arc::new(FrequencyTable::load_from_file(&config.data.frequency_file)?);

    let translations = read_pack(&config.data.bundled_pack_file)?;
    let transliterations = read_pack(&config.data.transliteration_file)?;

    let fetcher = HttpFetcher::with_timeout(
        config.network.pack_base_url.clone(),
        Duration::from_secs(config.network.request_timeout_secs),
    )?;

    let packs = PackManager::new(
        Arc::new(fetcher),
        preferences,
        meanings,
        BundledPacks {
            default_language: config.language.default_language.clone(),
            translations,
            transliterations,
        },
        config.data.pack_cache_dir.clone(),
    )
    .await;

    Ok(WordResolver::new(coordinates, frequency, packs, verses))
}

fn read_pack(path: &Path) -> Result<HashMap<String, String>, BootstrapError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
