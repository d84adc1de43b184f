//! Per-video readiness records.
//!
//! A video may only be queried once its record is [`VideoStatus::Ready`]. Records are
//! written `Pending` when ingestion starts and promoted to `Ready` only after the whole
//! ingestion pipeline succeeded.

mod memory;
mod sqlite;

pub use memory::MemoryVideoStore;
pub use sqlite::SqliteVideoStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ingestion state of a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Pending,
    Ready,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Pending => "pending",
            VideoStatus::Ready => "ready",
        }
    }
}

impl std::str::FromStr for VideoStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(VideoStatus::Pending),
            "ready" => Ok(VideoStatus::Ready),
            _ => Err(format!("Unknown video status: {}", s)),
        }
    }
}

impl std::fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cached state for one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub status: VideoStatus,
    /// Prose summary; empty while pending.
    pub summary: String,
    /// Every segment as a `[timestamp] text` line.
    pub full_transcript: String,
    /// Segments stored in the video's index.
    pub segments_indexed: usize,
    pub updated_at: DateTime<Utc>,
}

impl VideoRecord {
    /// A record for a video whose ingestion has just started.
    pub fn pending(video_id: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            status: VideoStatus::Pending,
            summary: String::new(),
            full_transcript: String::new(),
            segments_indexed: 0,
            updated_at: Utc::now(),
        }
    }

    /// A record for a fully ingested video.
    pub fn ready(
        video_id: &str,
        summary: String,
        full_transcript: String,
        segments_indexed: usize,
    ) -> Self {
        Self {
            video_id: video_id.to_string(),
            status: VideoStatus::Ready,
            summary,
            full_transcript,
            segments_indexed,
            updated_at: Utc::now(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == VideoStatus::Ready
    }
}

/// Keyed store of video records.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Fetch a record.
    async fn get(&self, video_id: &str) -> Result<Option<VideoRecord>>;

    /// Insert or overwrite a record.
    async fn put(&self, record: VideoRecord) -> Result<()>;

    /// Write `record` only if the current status equals `expected` (`None` = absent).
    /// Returns whether the write happened.
    async fn compare_and_set(
        &self,
        video_id: &str,
        expected: Option<VideoStatus>,
        record: VideoRecord,
    ) -> Result<bool>;

    /// Delete a record. Returns whether one existed.
    async fn remove(&self, video_id: &str) -> Result<bool>;

    /// All records, most recently updated first.
    async fn list(&self) -> Result<Vec<VideoRecord>>;
}
