// Repository trait for per-source chat data access
use crate::application::figure_updater::Chapter;
use crate::domain::emotes::EmoteTimestamps;
use crate::domain::series::Micros;
use async_trait::async_trait;

/// Everything the charts need from one source (one video).
#[derive(Debug, Clone, Default)]
pub struct ChatSource {
    pub id: String,
    pub messages: Vec<Micros>,
    pub emotes: EmoteTimestamps,
    pub chapters: Vec<Chapter>,
}

#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// List all source IDs with collected message timestamps
    async fn list_source_ids(&self) -> anyhow::Result<Vec<String>>;

    /// Message timestamps; empty when nothing was collected
    async fn load_messages(&self, source_id: &str) -> anyhow::Result<Vec<Micros>>;

    /// Emote name to timestamps; empty when no emotes were mined
    async fn load_emotes(&self, source_id: &str) -> anyhow::Result<EmoteTimestamps>;

    /// Chapter markers, if the platform provided any
    async fn load_chapters(&self, source_id: &str) -> anyhow::Result<Vec<Chapter>>;

    async fn load_source(&self, source_id: &str) -> anyhow::Result<ChatSource> {
        Ok(ChatSource {
            id: source_id.to_string(),
            messages: self.load_messages(source_id).await?,
            emotes: self.load_emotes(source_id).await?,
            chapters: self.load_chapters(source_id).await?,
        })
    }
}
