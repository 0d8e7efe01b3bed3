// JSON file repository implementation
use crate::application::chat_repository::ChatRepository;
use crate::application::figure_updater::Chapter;
use crate::domain::emotes::EmoteTimestamps;
use crate::domain::series::{Micros, micros_from_f64};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const TIMESTAMPS_SUFFIX: &str = "_timestamps.json";
const EMOTICONS_SUFFIX: &str = "_emoticons.json";
const CHAPTERS_SUFFIX: &str = "_chapters.json";

/// Reads the files the download pipeline leaves in a data directory:
/// `<id>_timestamps.json`, `<id>_emoticons.json` and `<id>_chapters.json`.
#[derive(Debug, Clone)]
pub struct JsonChatRepository {
    data_dir: PathBuf,
}

impl JsonChatRepository {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn source_file(&self, source_id: &str, suffix: &str) -> PathBuf {
        self.data_dir.join(format!("{}{}", source_id, suffix))
    }

    /// Parses a JSON file, treating a missing file as absent data.
    async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No data file at {}", path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(value))
    }
}

#[async_trait]
impl ChatRepository for JsonChatRepository {
    async fn list_source_ids(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.data_dir)
            .await
            .with_context(|| format!("Failed to list {}", self.data_dir.display()))?;

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(id) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_suffix(TIMESTAMPS_SUFFIX))
            {
                ids.push(id.to_string());
            }
        }
        ids.sort();

        tracing::debug!("Found {} sources in {}", ids.len(), self.data_dir.display());
        Ok(ids)
    }

    async fn load_messages(&self, source_id: &str) -> Result<Vec<Micros>> {
        let path = self.source_file(source_id, TIMESTAMPS_SUFFIX);
        let raw: Vec<f64> = Self::read_json(&path).await?.unwrap_or_default();

        Ok(raw.into_iter().map(micros_from_f64).collect())
    }

    async fn load_emotes(&self, source_id: &str) -> Result<EmoteTimestamps> {
        let path = self.source_file(source_id, EMOTICONS_SUFFIX);
        let raw: BTreeMap<String, Vec<f64>> = Self::read_json(&path).await?.unwrap_or_default();

        Ok(raw
            .into_iter()
            .map(|(name, timestamps)| {
                (name, timestamps.into_iter().map(micros_from_f64).collect())
            })
            .collect())
    }

    async fn load_chapters(&self, source_id: &str) -> Result<Vec<Chapter>> {
        let path = self.source_file(source_id, CHAPTERS_SUFFIX);
        Ok(Self::read_json(&path).await?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write(dir: &Path, name: &str, contents: &str) {
        tokio::fs::write(dir.join(name), contents).await.unwrap();
    }

    #[tokio::test]
    async fn test_loads_source_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "abc_timestamps.json", "[3000000, 1000000.5, 2000000]").await;
        write(dir.path(), "abc_emoticons.json", r#"{"Kappa": [1000000, 2500000.9]}"#).await;
        write(
            dir.path(),
            "abc_chapters.json",
            r#"[{"title": "Intro", "start": 0, "end": 60000000}]"#,
        )
        .await;

        let repository = JsonChatRepository::new(dir.path());
        let source = repository.load_source("abc").await.unwrap();

        assert_eq!(source.id, "abc");
        assert_eq!(source.messages, vec![3_000_000, 1_000_000, 2_000_000]);
        assert_eq!(source.emotes["Kappa"], vec![1_000_000, 2_500_000]);
        assert_eq!(source.chapters.len(), 1);
        assert_eq!(source.chapters[0].title, "Intro");
    }

    #[tokio::test]
    async fn test_missing_files_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repository = JsonChatRepository::new(dir.path());

        let source = repository.load_source("nothing").await.unwrap();
        assert!(source.messages.is_empty());
        assert!(source.emotes.is_empty());
        assert!(source.chapters.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad_timestamps.json", "{not json").await;

        let repository = JsonChatRepository::new(dir.path());
        assert!(repository.load_messages("bad").await.is_err());
    }

    #[tokio::test]
    async fn test_lists_sources() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b_timestamps.json", "[]").await;
        write(dir.path(), "a_timestamps.json", "[]").await;
        write(dir.path(), "a_emoticons.json", "{}").await;
        write(dir.path(), "a_meta.json", "{}").await;

        let repository = JsonChatRepository::new(dir.path());
        assert_eq!(repository.list_source_ids().await.unwrap(), vec!["a", "b"]);
    }
}
