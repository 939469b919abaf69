use async_trait::async_trait;
use tokio::sync::Mutex;

/// External key-value store holding the user's language choice.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn active_language(&self) -> Option<String>;

    async fn set_active_language(&self, id: &str);
}

/// In-memory store for tests and hosts without a persistent store.
#[derive(Default)]
pub struct MemoryPreferences {
    language: Mutex<Option<String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferences {
    async fn active_language(&self) -> Option<String> {
        self.language.lock().await.clone()
    }

    async fn set_active_language(&self, id: &str) {
        *self.language.lock().await = Some(id.to_string());
    }
}
