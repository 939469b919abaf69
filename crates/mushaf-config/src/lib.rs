use serde::{Deserialize, Serialize};

use self::data::DataConfig;
use self::language::LanguageConfig;
use self::network::NetworkConfig;

pub mod data;
pub mod language;
pub mod network;

#[derive(Serialize, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    pub data: DataConfig,
    pub language: LanguageConfig,
}

impl Config {
    pub fn new() -> Self {
        Config {
            network: NetworkConfig::new(),
            data: DataConfig::new(),
            language: LanguageConfig::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
