pub mod fetcher;
pub mod manager;
pub mod preference;
pub mod source;

#[cfg(test)]
mod tests;

pub use fetcher::{HttpFetcher, PackDownload, PackFetcher};
pub use manager::{BundledPacks, PackManager, PackState};
pub use preference::{MemoryPreferences, PreferenceStore};
pub use source::TranslationSource;

#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Pack fetch failed: HTTP {0}")]
    Http(u16),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Download cancelled")]
    Cancelled,

    #[error("Pack load previously failed")]
    LoadFailed,
}
