use async_trait::async_trait;

/// Supplies canonical verse text. The host application owns the text
/// database; the engine only reads through this seam.
#[async_trait]
pub trait VerseSource: Send + Sync {
    async fn verse_text(&self, surah: u16, ayah: u16) -> Option<String>;
}

/// Display parameters of the currently rendered page, supplied by the
/// host's page view on every query.
#[derive(Debug, Clone, Copy)]
pub struct PageViewport {
    pub page: u16,
    pub scale: f32,
    pub content_offset_y: f32,
}
