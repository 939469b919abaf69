pub mod frequency;
pub mod lexicon;

pub use frequency::{CorpusStats, FrequencyTable};
pub use lexicon::{LexiconEntry, MeaningIndex};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
