//! Clipchat - chat with the transcript of a video
//!
//! Paste a video URL, then ask natural-language questions answered from what is said
//! in the video.
//!
//! # Overview
//!
//! Loading a video fetches its captions, normalizes them into timestamped segments,
//! embeds and indexes those segments in a per-video collection, and caches a prose
//! summary. Questions are answered from the most similar segments, citing timestamps.
//! A video can only be queried once loading completed.
//!
//! # Architecture
//!
//! - `transcript` - Transcript providers and segment normalization
//! - `embedding` - Embedding generation
//! - `vector_store` - Per-video similarity index
//! - `indexing` - Batched embedding upload with validation
//! - `summary` - Sampled whole-video summaries
//! - `llm` - Language model abstraction and failure policies
//! - `rag` - Retrieval and grounded answers
//! - `video_store` - Per-video readiness records
//! - `orchestrator` - Pipeline coordination
//! - `config` - Configuration management
//!
//! # Example
//!
//! ```rust,no_run
//! use clipchat::config::Settings;
//! use clipchat::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let loaded = orchestrator.ingest("https://youtu.be/dQw4w9WgXcQ").await?;
//!     println!("{}", loaded.summary);
//!
//!     let answer = orchestrator.answer(&loaded.video_id, "What is the song about?").await?;
//!     println!("{}", answer.format_for_display());
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod indexing;
pub mod llm;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod summary;
pub mod transcript;
pub mod vector_store;
pub mod video_store;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{ClipchatError, Result};
