//! Retrieval and prompt context for answers.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::{SearchHit, VectorIndex};
use std::sync::Arc;
use tracing::debug;

/// Used when retrieval found nothing.
pub const NO_RELEVANT_SECTIONS: &str =
    "No specific transcript sections found relevant to your query.";
/// Used when a video has no cached summary.
pub const NO_SUMMARY: &str = "No summary available.";

/// Embeds a query and searches a video's collection.
#[derive(Clone)]
pub struct Retriever {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
}

impl Retriever {
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self { index, embedder }
    }

    /// Top `limit` segments of `collection` for `query`, best first.
    pub async fn retrieve(&self, collection: &str, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let query_embedding = self.embedder.embed(query).await?;
        let hits = self.index.search(collection, &query_embedding, limit).await?;
        debug!("Retrieved {} segments from {}", hits.len(), collection);
        Ok(hits)
    }
}

/// Format retrieved segments as `[timestamp] text` lines for the prompt.
pub fn format_sections(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return NO_RELEVANT_SECTIONS.to_string();
    }

    hits.iter()
        .map(|hit| hit.segment.as_line())
        .collect::<Vec<_>>()
        .join("\n")
}

/// The cached summary, or a placeholder when there is none.
pub fn summary_or_placeholder(summary: &str) -> &str {
    if summary.trim().is_empty() {
        NO_SUMMARY
    } else {
        summary
    }
}
