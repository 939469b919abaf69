use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct DataConfig {
    /// Root directory of the static datasets.
    pub data_dir: PathBuf,
    /// Where downloaded packs are cached.
    pub pack_cache_dir: PathBuf,
    pub coordinates_file: PathBuf,
    pub lexicon_file: PathBuf,
    pub frequency_file: PathBuf,
    /// Resident default-language translations shipped with the app.
    pub bundled_pack_file: PathBuf,
    pub transliteration_file: PathBuf,
}

impl DataConfig {
    pub fn new() -> Self {
        let data_dir = env::var("MUSHAF_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        Self {
            pack_cache_dir: data_dir.join("packs"),
            coordinates_file: data_dir.join("word-coordinates.json"),
            lexicon_file: data_dir.join("lexicon.json"),
            frequency_file: data_dir.join("frequency.json"),
            bundled_pack_file: data_dir.join("translation-default.json"),
            transliteration_file: data_dir.join("transliteration.json"),
            data_dir,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self::new()
    }
}
