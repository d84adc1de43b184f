//! YouTube transcript provider backed by yt-dlp caption downloads.

use super::{RawTranscriptEntry, TranscriptProvider};
use crate::error::{ClipchatError, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::process::Command;
use tracing::{debug, info, instrument};

static VIDEO_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?:v=|/)([0-9A-Za-z_-]{11})
        |
        # Bare video ID (11 characters)
        ^([0-9A-Za-z_-]{11})$
    ",
    )
    .expect("Invalid regex")
});

/// Extract the 11-character video ID from a YouTube URL or bare ID.
pub fn extract_video_id(input: &str) -> Option<String> {
    let caps = VIDEO_ID_REGEX.captures(input.trim())?;

    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Caption track in YouTube's json3 format.
#[derive(Debug, Deserialize)]
struct Json3Track {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: Option<u64>,
    #[serde(default)]
    segs: Option<Vec<Json3Seg>>,
    #[serde(default)]
    a_append: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Parse a json3 caption track into raw entries.
///
/// Events without text segments and line-break append events are skipped.
pub fn parse_json3(content: &str) -> Result<Vec<RawTranscriptEntry>> {
    let track: Json3Track = serde_json::from_str(content)?;

    let entries = track
        .events
        .into_iter()
        .filter(|event| event.a_append.unwrap_or(0) == 0)
        .filter_map(|event| {
            let segs = event.segs?;
            let text: String = segs.iter().map(|s| s.utf8.as_str()).collect();
            Some(RawTranscriptEntry {
                text: Some(text.replace('\n', " ").trim().to_string()),
                start: event.t_start_ms.map(|ms| ms as f64 / 1000.0),
            })
        })
        .collect();

    Ok(entries)
}

/// Fetches captions (manual first, then automatic) with yt-dlp.
pub struct YoutubeTranscriptProvider {
    languages: Vec<String>,
    temp_root: PathBuf,
}

impl YoutubeTranscriptProvider {
    pub fn new(languages: Vec<String>, temp_root: PathBuf) -> Self {
        Self {
            languages,
            temp_root,
        }
    }

    fn sub_langs(&self) -> String {
        if self.languages.is_empty() {
            "en.*".to_string()
        } else {
            self.languages.join(",")
        }
    }

    /// Locate the first downloaded json3 caption file.
    fn find_caption_file(dir: &Path, video_id: &str) -> Result<Option<PathBuf>> {
        let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or_default();
                name.starts_with(video_id) && name.ends_with(".json3")
            })
            .collect();

        candidates.sort();
        Ok(candidates.into_iter().next())
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeTranscriptProvider {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Result<Vec<RawTranscriptEntry>> {
        std::fs::create_dir_all(&self.temp_root)?;
        let work_dir = tempfile::Builder::new()
            .prefix("captions-")
            .tempdir_in(&self.temp_root)?;

        let url = format!("https://www.youtube.com/watch?v={}", video_id);
        let template = work_dir.path().join(format!("{}.%(ext)s", video_id));

        info!("Downloading captions for {}", video_id);

        let result = Command::new("yt-dlp")
            .arg("--skip-download")
            .arg("--write-subs")
            .arg("--write-auto-subs")
            .arg("--sub-format").arg("json3")
            .arg("--sub-langs").arg(self.sub_langs())
            .arg("--output").arg(template.to_str().unwrap_or_default())
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg(&url)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ClipchatError::ToolNotFound("yt-dlp".into()));
            }
            Err(e) => {
                return Err(ClipchatError::ToolFailed(format!("yt-dlp execution failed: {e}")));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClipchatError::TranscriptUnavailable(format!(
                "yt-dlp could not fetch captions for {video_id}: {stderr}"
            )));
        }

        let caption_path = Self::find_caption_file(work_dir.path(), video_id)?.ok_or_else(|| {
            ClipchatError::TranscriptUnavailable(format!(
                "No captions available for video {video_id}"
            ))
        })?;

        debug!("Parsing captions from {:?}", caption_path);
        let content = std::fs::read_to_string(&caption_path)?;
        let entries = parse_json3(&content)?;

        if entries.is_empty() {
            return Err(ClipchatError::TranscriptUnavailable(format!(
                "Caption track for video {video_id} is empty"
            )));
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?t=42"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));

        assert_eq!(extract_video_id("not a video"), None);
        assert_eq!(extract_video_id("https://youtu.be/short"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_parse_json3() {
        let content = r#"{
            "events": [
                {"tStartMs": 0, "dDurationMs": 5000},
                {"tStartMs": 1200, "dDurationMs": 3000, "segs": [{"utf8": "hello"}, {"utf8": " world"}]},
                {"tStartMs": 4200, "aAppend": 1, "segs": [{"utf8": "\n"}]},
                {"tStartMs": 61500, "segs": [{"utf8": "second\nline"}]}
            ]
        }"#;

        let entries = parse_json3(content).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], RawTranscriptEntry::new("hello world", 1.2));
        assert_eq!(entries[1], RawTranscriptEntry::new("second line", 61.5));
    }

    #[test]
    fn test_parse_json3_rejects_garbage() {
        assert!(parse_json3("not json").is_err());
        assert!(parse_json3("{}").unwrap().is_empty());
    }

    #[test]
    fn test_sub_langs() {
        let provider = YoutubeTranscriptProvider::new(vec![], PathBuf::from("/tmp"));
        assert_eq!(provider.sub_langs(), "en.*");

        let provider = YoutubeTranscriptProvider::new(
            vec!["en".to_string(), "de".to_string()],
            PathBuf::from("/tmp"),
        );
        assert_eq!(provider.sub_langs(), "en,de");
    }

    #[test]
    fn test_find_caption_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dQw4w9WgXcQ.en.json3"), "{}").unwrap();
        std::fs::write(dir.path().join("other.txt"), "").unwrap();

        let found = YoutubeTranscriptProvider::find_caption_file(dir.path(), "dQw4w9WgXcQ")
            .unwrap()
            .unwrap();
        assert!(found.ends_with("dQw4w9WgXcQ.en.json3"));

        assert!(YoutubeTranscriptProvider::find_caption_file(dir.path(), "zzzzzzzzzzz")
            .unwrap()
            .is_none());
    }
}
