//! Configuration settings for Clipchat.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub transcript: TranscriptSettings,
    pub embedding: EmbeddingSettings,
    pub llm: LlmSettings,
    pub vector_store: VectorStoreSettings,
    pub video_store: VideoStoreSettings,
    pub rag: RagSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Directory for temporary files.
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.clipchat".to_string(),
            temp_dir: "/tmp/clipchat".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Where transcripts come from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptProviderKind {
    /// YouTube captions via yt-dlp.
    #[default]
    Youtube,
    /// JSON transcript files in `transcript.dir`.
    File,
}

impl std::str::FromStr for TranscriptProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "youtube" | "yt-dlp" => Ok(TranscriptProviderKind::Youtube),
            "file" => Ok(TranscriptProviderKind::File),
            _ => Err(format!("Unknown transcript provider: {}", s)),
        }
    }
}

impl std::fmt::Display for TranscriptProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptProviderKind::Youtube => write!(f, "youtube"),
            TranscriptProviderKind::File => write!(f, "file"),
        }
    }
}

/// Transcript retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Transcript provider (youtube, file).
    pub provider: TranscriptProviderKind,
    /// Caption languages to request, in preference order.
    pub languages: Vec<String>,
    /// Directory of `<video_id>.json` files (for the file provider).
    pub dir: String,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            provider: TranscriptProviderKind::Youtube,
            languages: vec!["en".to_string(), "en-US".to_string(), "en-GB".to_string()],
            dir: "~/.clipchat/transcripts".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai).
    pub provider: String,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions. Vectors of any other length are not indexed.
    pub dimensions: u32,
    /// Segments per embedding request.
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 768,
            batch_size: 100,
        }
    }
}

/// Language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Chat model used for summaries and answers.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
        }
    }
}

/// Backend for the vector index and the video store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreProvider {
    /// Persisted in a SQLite file.
    #[default]
    Sqlite,
    /// Kept in memory for the lifetime of the process.
    Memory,
}

impl std::fmt::Display for StoreProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreProvider::Sqlite => write!(f, "sqlite"),
            StoreProvider::Memory => write!(f, "memory"),
        }
    }
}

/// Vector index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Vector index provider (sqlite, memory).
    pub provider: StoreProvider,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: StoreProvider::Sqlite,
            sqlite_path: "~/.clipchat/vectors.db".to_string(),
        }
    }
}

/// Video readiness store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoStoreSettings {
    /// Video store provider (sqlite, memory).
    pub provider: StoreProvider,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for VideoStoreSettings {
    fn default() -> Self {
        Self {
            provider: StoreProvider::Sqlite,
            sqlite_path: "~/.clipchat/videos.db".to_string(),
        }
    }
}

/// Question answering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// Number of transcript segments retrieved per question.
    pub top_k: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self { top_k: 8 }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ClipchatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clipchat")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Get the expanded transcript directory path.
    pub fn transcript_dir(&self) -> PathBuf {
        Self::expand_path(&self.transcript.dir)
    }

    /// Get the expanded vector index database path.
    pub fn vector_store_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.sqlite_path)
    }

    /// Get the expanded video store database path.
    pub fn video_store_path(&self) -> PathBuf {
        Self::expand_path(&self.video_store.sqlite_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.embedding.dimensions, 768);
        assert_eq!(settings.embedding.batch_size, 100);
        assert_eq!(settings.rag.top_k, 8);
        assert_eq!(settings.llm.temperature, 0.0);
        assert_eq!(settings.transcript.provider, TranscriptProviderKind::Youtube);
        assert_eq!(settings.video_store.provider, StoreProvider::Sqlite);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [transcript]
            provider = "file"
            dir = "/data/transcripts"

            [vector_store]
            provider = "memory"

            [rag]
            top_k = 4
            "#,
        )
        .unwrap();

        assert_eq!(settings.transcript.provider, TranscriptProviderKind::File);
        assert_eq!(settings.transcript_dir(), PathBuf::from("/data/transcripts"));
        assert_eq!(settings.vector_store.provider, StoreProvider::Memory);
        assert_eq!(settings.rag.top_k, 4);
        assert_eq!(settings.embedding.model, "text-embedding-3-small");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.llm.model = "gpt-4.1".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.llm.model, "gpt-4.1");
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!(
            "File".parse::<TranscriptProviderKind>(),
            Ok(TranscriptProviderKind::File)
        );
        assert_eq!(
            "yt-dlp".parse::<TranscriptProviderKind>(),
            Ok(TranscriptProviderKind::Youtube)
        );
        assert!("nope".parse::<TranscriptProviderKind>().is_err());
    }
}
