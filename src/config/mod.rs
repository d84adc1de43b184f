//! Configuration module for Clipchat.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AnswerPrompts, Prompts, SummaryPrompts};
pub use settings::{
    EmbeddingSettings, GeneralSettings, LlmSettings, PromptSettings, RagSettings, Settings,
    StoreProvider, TranscriptProviderKind, TranscriptSettings, VectorStoreSettings,
    VideoStoreSettings,
};
