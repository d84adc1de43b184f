//! RAG (Retrieval-Augmented Generation) for questions about one video.
//!
//! Retrieves the most relevant transcript segments of a video and grounds the model's
//! answer in them.

mod answer;
pub mod context;

pub use answer::{QueryAnswerer, DEFAULT_TOP_K};
pub use context::Retriever;

use crate::vector_store::SearchHit;

/// Answer returned to the caller.
#[derive(Debug, Clone)]
pub struct Answer {
    /// The answer text.
    pub answer: String,
    /// Segments the answer was grounded on; empty for shortcut answers.
    pub sources: Vec<SearchHit>,
}

impl Answer {
    pub(crate) fn direct(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            sources: Vec::new(),
        }
    }

    /// Format the answer with its sources for terminal display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer.clone();

        if !self.sources.is_empty() {
            output.push_str("\n\n--- Sources ---\n");
            for source in &self.sources {
                output.push_str(&format!(
                    "\n[{}] (score: {:.2}) {}",
                    source.segment.timestamp, source.score, source.segment.text
                ));
            }
        }

        output
    }
}
