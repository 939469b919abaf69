/// Where word translations for the current selection come from.
///
/// The dictionary-gloss mode is a variant here rather than a magic language
/// id, so dispatch over the three kinds is exhaustive; the string form only
/// exists at the preference-store boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationSource {
    /// The bundled default-language pack, always resident.
    Bundled,
    /// A per-language pack loaded on demand.
    Lazy(String),
    /// The rare-word dictionary gloss path.
    PhraseDictionary,
}

impl TranslationSource {
    /// Persisted language id selecting the dictionary-gloss mode.
    pub const DICTIONARY_ID: &'static str = "dictionary";

    pub fn from_language_id(id: &str, default_language: &str) -> Self {
        if id == Self::DICTIONARY_ID {
            Self::PhraseDictionary
        } else if id == default_language {
            Self::Bundled
        } else {
            Self::Lazy(id.to_string())
        }
    }

    pub fn language_id<'a>(&'a self, default_language: &'a str) -> &'a str {
        match self {
            Self::Bundled => default_language,
            Self::Lazy(id) => id,
            Self::PhraseDictionary => Self::DICTIONARY_ID,
        }
    }
}
