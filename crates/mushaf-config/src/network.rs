use std::env;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Base location the per-language pack files are fetched from.
    pub pack_base_url: String,
    pub request_timeout_secs: u64,
}

impl NetworkConfig {
    pub fn new() -> Self {
        let pack_base_url = env::var("PACK_BASE_URL")
            .unwrap_or_else(|_| "https://packs.mushaf.app/translations".to_string());

        let request_timeout_secs = env::var("PACK_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);

        Self {
            pack_base_url,
            request_timeout_secs,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::new()
    }
}
