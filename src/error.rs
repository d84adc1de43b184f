//! Error types for Clipchat.

use thiserror::Error;

/// Library-level error type for Clipchat operations.
#[derive(Error, Debug)]
pub enum ClipchatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid video reference: {0}")]
    InvalidVideoReference(String),

    #[error("Transcript unavailable: {0}")]
    TranscriptUnavailable(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Embedding rejected: {0}")]
    EmbeddingValidation(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Video store error: {0}")]
    VideoStore(String),

    #[error("Language model error: {0}")]
    LanguageModel(String),

    #[error("Summary generation failed: {0}")]
    SummaryGeneration(String),

    #[error("Video not processed yet: {0}")]
    VideoNotProcessed(String),

    #[error("Failed to process query: {0}")]
    QueryProcessing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),
}

impl ClipchatError {
    /// Whether this error means the caller asked about something that does not exist yet.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClipchatError::VideoNotProcessed(_))
    }
}

/// Result type alias for Clipchat operations.
pub type Result<T> = std::result::Result<T, ClipchatError>;
