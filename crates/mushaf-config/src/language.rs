use std::env;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Language of the bundled resident pack.
    pub default_language: String,
}

impl LanguageConfig {
    pub fn new() -> Self {
        let default_language =
            env::var("MUSHAF_DEFAULT_LANGUAGE").unwrap_or_else(|_| "en".to_string());

        Self { default_language }
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self::new()
    }
}
