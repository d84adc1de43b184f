//! Transcript provider reading pre-fetched JSON transcripts from disk.

use super::{RawTranscriptEntry, TranscriptProvider};
use crate::error::{ClipchatError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Reads `<dir>/<video_id>.json`, a JSON array of `{text, start | offset}` entries.
pub struct FileTranscriptProvider {
    dir: PathBuf,
}

impl FileTranscriptProvider {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, video_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", video_id))
    }
}

#[async_trait]
impl TranscriptProvider for FileTranscriptProvider {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Result<Vec<RawTranscriptEntry>> {
        let path = self.path_for(video_id);

        if !path.exists() {
            return Err(ClipchatError::TranscriptUnavailable(format!(
                "No transcript file at {}",
                path.display()
            )));
        }

        let content = tokio::fs::read_to_string(&path).await?;
        let entries: Option<Vec<RawTranscriptEntry>> = serde_json::from_str(&content)?;
        let entries = entries.unwrap_or_default();

        if entries.is_empty() {
            return Err(ClipchatError::TranscriptUnavailable(format!(
                "Transcript file {} is empty",
                path.display()
            )));
        }

        debug!("Read {} entries from {:?}", entries.len(), path);
        Ok(entries)
    }
}
