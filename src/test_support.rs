//! In-process fakes shared by unit tests.

use crate::embedding::Embedder;
use crate::error::{ClipchatError, Result};
use crate::llm::{ChatMessage, LanguageModel};
use crate::transcript::{format_timestamp, RawTranscriptEntry, Segment, TranscriptProvider};
use crate::vector_store::{IndexedSegment, SearchHit, VectorIndex};
use crate::video_store::VideoRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

pub fn segment(video_id: &str, text: &str, start: f64) -> Segment {
    Segment {
        text: text.to_string(),
        start_seconds: start,
        timestamp: format_timestamp(start),
        video_id: video_id.to_string(),
    }
}

/// `n` segments with texts `segment 0..n`, one second apart.
pub fn segments(video_id: &str, n: usize) -> Vec<Segment> {
    (0..n)
        .map(|i| segment(video_id, &format!("segment {}", i), i as f64))
        .collect()
}

pub fn ready_record(video_id: &str, summary: &str) -> VideoRecord {
    VideoRecord::ready(video_id, summary.to_string(), String::new(), 0)
}

/// Embedder returning all-ones vectors.
///
/// Bad positions count across every `embed_batch` call and yield a vector one element short.
pub struct FakeEmbedder {
    dimensions: usize,
    bad_positions: Vec<usize>,
    truncate_to: Option<usize>,
    fail: bool,
    seen: Mutex<usize>,
    batch_sizes: Mutex<Vec<usize>>,
    calls: Mutex<usize>,
}

impl FakeEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            bad_positions: Vec::new(),
            truncate_to: None,
            fail: false,
            seen: Mutex::new(0),
            batch_sizes: Mutex::new(Vec::new()),
            calls: Mutex::new(0),
        }
    }

    pub fn with_bad_positions(mut self, positions: Vec<usize>) -> Self {
        self.bad_positions = positions;
        self
    }

    /// Return at most `n` vectors per batch.
    pub fn truncating_to(mut self, n: usize) -> Self {
        self.truncate_to = Some(n);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().unwrap().clone()
    }

    /// Calls to `embed` and `embed_batch` combined.
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        *self.calls.lock().unwrap() += 1;
        if self.fail {
            return Err(ClipchatError::Embedding(format!("cannot embed {:?}", text)));
        }
        Ok(vec![1.0; self.dimensions])
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        *self.calls.lock().unwrap() += 1;
        if self.fail {
            return Err(ClipchatError::Embedding("embedding service down".to_string()));
        }
        self.batch_sizes.lock().unwrap().push(texts.len());

        let mut seen = self.seen.lock().unwrap();
        let mut vectors: Vec<Vec<f32>> = texts
            .iter()
            .enumerate()
            .map(|(i, _)| {
                if self.bad_positions.contains(&(*seen + i)) {
                    vec![1.0; self.dimensions.saturating_sub(1)]
                } else {
                    vec![1.0; self.dimensions]
                }
            })
            .collect();
        *seen += texts.len();

        if let Some(n) = self.truncate_to {
            vectors.truncate(n);
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Language model with a fixed reply that records every request.
pub struct ScriptedModel {
    reply: Option<String>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.reply
            .clone()
            .ok_or_else(|| ClipchatError::LanguageModel("model unavailable".to_string()))
    }
}

/// Vector index that only records upserts.
#[derive(Default)]
pub struct RecordingIndex {
    upserts: Mutex<Vec<(String, Vec<IndexedSegment>)>>,
}

impl RecordingIndex {
    pub fn upserts(&self) -> Vec<(String, Vec<IndexedSegment>)> {
        self.upserts.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorIndex for RecordingIndex {
    async fn upsert(&self, collection: &str, items: &[IndexedSegment]) -> Result<usize> {
        self.upserts
            .lock()
            .unwrap()
            .push((collection.to_string(), items.to_vec()));
        Ok(items.len())
    }

    async fn search(&self, _: &str, _: &[f32], _: usize) -> Result<Vec<SearchHit>> {
        Ok(Vec::new())
    }

    async fn clear(&self, _: &str) -> Result<usize> {
        Ok(0)
    }

    async fn promote(&self, _: &str, _: &str) -> Result<usize> {
        Ok(0)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        Ok(self
            .upserts
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == collection)
            .map(|(_, items)| items.len())
            .sum())
    }

    async fn collections(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .upserts
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect();
        names.dedup();
        Ok(names)
    }
}

/// Transcript provider serving canned entries per video.
#[derive(Default)]
pub struct StaticTranscripts {
    entries: HashMap<String, Vec<RawTranscriptEntry>>,
    fetches: Mutex<usize>,
}

impl StaticTranscripts {
    pub fn with(mut self, video_id: &str, entries: Vec<RawTranscriptEntry>) -> Self {
        self.entries.insert(video_id.to_string(), entries);
        self
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetches.lock().unwrap()
    }
}

#[async_trait]
impl TranscriptProvider for StaticTranscripts {
    async fn fetch(&self, video_id: &str) -> Result<Vec<RawTranscriptEntry>> {
        *self.fetches.lock().unwrap() += 1;
        match self.entries.get(video_id) {
            Some(entries) if !entries.is_empty() => Ok(entries.clone()),
            _ => Err(ClipchatError::TranscriptUnavailable(format!(
                "no transcript for {}",
                video_id
            ))),
        }
    }
}
