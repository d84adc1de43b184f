//! Transcript retrieval and normalization.
//!
//! Providers return raw time-coded caption entries; [`normalize`] turns them into
//! ordered [`Segment`]s with display timestamps.

mod file;
mod youtube;

pub use file::FileTranscriptProvider;
pub use youtube::{extract_video_id, parse_json3, YoutubeTranscriptProvider};

use crate::error::{ClipchatError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Text used when a caption entry carries no speech.
pub const INAUDIBLE_PLACEHOLDER: &str = "[Inaudible]";

/// A raw caption entry as delivered by a transcript provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTranscriptEntry {
    /// Caption text, possibly missing or blank.
    #[serde(default)]
    pub text: Option<String>,
    /// Start offset in seconds. Some sources call this field `offset`.
    #[serde(default, alias = "offset")]
    pub start: Option<f64>,
}

impl RawTranscriptEntry {
    pub fn new(text: impl Into<String>, start: f64) -> Self {
        Self {
            text: Some(text.into()),
            start: Some(start),
        }
    }
}

/// One timestamped unit of transcript text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Spoken text. Never empty.
    pub text: String,
    /// Start offset in seconds.
    pub start_seconds: f64,
    /// Display timestamp (`HH:MM:SS.ss`).
    pub timestamp: String,
    /// Video this segment belongs to.
    pub video_id: String,
}

impl Segment {
    /// Render as a `[timestamp] text` line, the format used in every prompt.
    pub fn as_line(&self) -> String {
        format!("[{}] {}", self.timestamp, self.text)
    }
}

/// Source of raw transcripts keyed by video identifier.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the ordered caption entries for a video.
    async fn fetch(&self, video_id: &str) -> Result<Vec<RawTranscriptEntry>>;
}

/// Format a start offset as `HH:MM:SS.ss`.
///
/// Hours are derived from whole minutes rather than from the raw offset, so the
/// output stays byte-compatible with timestamps already stored by earlier loads.
pub fn format_timestamp(start: f64) -> String {
    let start = if start.is_finite() { start.max(0.0) } else { 0.0 };
    let mins = (start / 60.0).floor() as u64;
    let hrs = mins / 60;
    format!("{:02}:{:02}:{:05.2}", hrs, mins % 60, start % 60.0)
}

/// Convert raw entries into ordered segments.
///
/// Blank or missing text becomes [`INAUDIBLE_PLACEHOLDER`]; anything still empty after
/// trimming is dropped.
pub fn normalize(video_id: &str, entries: &[RawTranscriptEntry]) -> Result<Vec<Segment>> {
    if entries.is_empty() {
        return Err(ClipchatError::TranscriptUnavailable(format!(
            "No transcript entries for video {}",
            video_id
        )));
    }

    let segments: Vec<Segment> = entries
        .iter()
        .map(|entry| {
            let start = entry.start.unwrap_or(0.0);
            let text = match entry.text.as_deref() {
                Some(t) if !t.trim().is_empty() => t.to_string(),
                _ => INAUDIBLE_PLACEHOLDER.to_string(),
            };

            Segment {
                text,
                start_seconds: start,
                timestamp: format_timestamp(start),
                video_id: video_id.to_string(),
            }
        })
        .filter(|segment| !segment.text.trim().is_empty())
        .collect();

    debug!(
        "Normalized {} entries into {} segments",
        entries.len(),
        segments.len()
    );

    Ok(segments)
}

/// Render the whole transcript as `[timestamp] text` lines.
pub fn render_full_transcript(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(Segment::as_line)
        .collect::<Vec<_>>()
        .join("\n")
}
