//! Vector index abstraction for Clipchat.
//!
//! Each video's segments live in their own named collection (see [`collection_name`]).

mod memory;
mod sqlite;

pub use memory::MemoryVectorIndex;
pub use sqlite::SqliteVectorIndex;

use crate::error::Result;
use crate::transcript::Segment;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the collection holding a video's segments.
pub fn collection_name(video_id: &str) -> String {
    format!("yt-{}", video_id)
}

/// Name of the collection a re-index is built in before it replaces the live one.
pub fn staging_name(collection: &str) -> String {
    format!("{}.staging", collection)
}

/// A segment stored together with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedSegment {
    /// Unique row ID.
    pub id: Uuid,
    /// The transcript segment.
    pub segment: Segment,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this pair was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl IndexedSegment {
    pub fn new(segment: Segment, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            segment,
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// The matched segment.
    pub segment: Segment,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for vector index implementations.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert pairs into a collection, creating it if needed. Returns the number stored.
    async fn upsert(&self, collection: &str, items: &[IndexedSegment]) -> Result<usize>;

    /// Nearest neighbours of `query_embedding` in a collection, best first.
    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchHit>>;

    /// Remove every pair from a collection. Returns the number removed.
    async fn clear(&self, collection: &str) -> Result<usize>;

    /// Atomically replace `collection` with the pairs of `staging`, leaving `staging`
    /// empty. Returns the number of pairs now in `collection`.
    async fn promote(&self, staging: &str, collection: &str) -> Result<usize>;

    /// Number of pairs in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Names of all non-empty collections.
    async fn collections(&self) -> Result<Vec<String>>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Score every item against the query and keep the best `limit`.
pub(crate) fn rank(
    items: impl Iterator<Item = IndexedSegment>,
    query_embedding: &[f32],
    limit: usize,
) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = items
        .map(|item| SearchHit {
            score: cosine_similarity(query_embedding, &item.embedding),
            segment: item.segment,
        })
        .collect();

    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    hits.truncate(limit);
    hits
}
