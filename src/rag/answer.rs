//! Question answering against one video's index.

use super::context::{format_sections, summary_or_placeholder, Retriever};
use super::Answer;
use crate::config::Prompts;
use crate::error::{ClipchatError, Result};
use crate::llm::{complete_with_policy, ChatMessage, FailurePolicy, LanguageModel};
use crate::vector_store::collection_name;
use crate::video_store::VideoRecord;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Segments retrieved per question unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 8;

/// Returned for blank questions.
pub const EMPTY_QUESTION: &str = "Please provide a valid question about the video.";
/// Returned when the model answers with an empty response.
pub const NO_RESPONSE: &str = "No response generated.";
/// Lead-in for answers served straight from the cached summary.
pub const SUMMARY_LEAD_IN: &str = "Here's a summary of the video:\n\n";

/// Answers questions about an ingested video.
pub struct QueryAnswerer {
    retriever: Retriever,
    model: Arc<dyn LanguageModel>,
    prompts: Prompts,
    top_k: usize,
}

impl QueryAnswerer {
    pub fn new(retriever: Retriever, model: Arc<dyn LanguageModel>) -> Self {
        Self {
            retriever,
            model,
            prompts: Prompts::default(),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Set how many segments are retrieved per question.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Build the grounded system prompt.
    pub fn system_prompt(&self, summary: &str, sections: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("summary".to_string(), summary_or_placeholder(summary).to_string());
        vars.insert("sections".to_string(), sections.to_string());
        self.prompts.render_with_custom(&self.prompts.answer.system, &vars)
    }

    /// Answer a question about the video described by `record`.
    ///
    /// Blank questions and summary requests never reach retrieval or the model. Model
    /// and retrieval failures surface as [`ClipchatError::QueryProcessing`].
    #[instrument(skip(self, record), fields(video_id = %record.video_id))]
    pub async fn answer(&self, record: &VideoRecord, question: &str) -> Result<Answer> {
        if question.trim().is_empty() {
            return Ok(Answer::direct(EMPTY_QUESTION));
        }

        if question.to_lowercase().contains("summary") {
            debug!("Serving cached summary");
            return Ok(Answer::direct(format!("{}{}", SUMMARY_LEAD_IN, record.summary)));
        }

        info!("Processing question: {}", question);

        let hits = self
            .retriever
            .retrieve(&collection_name(&record.video_id), question, self.top_k)
            .await
            .map_err(|e| ClipchatError::QueryProcessing(e.to_string()))?;

        let system_prompt = self.system_prompt(&record.summary, &format_sections(&hits));
        let messages = [ChatMessage::system(system_prompt), ChatMessage::user(question)];

        let answer = complete_with_policy(
            self.model.as_ref(),
            &messages,
            NO_RESPONSE,
            &FailurePolicy::Propagate,
        )
        .await
        .map_err(|e| ClipchatError::QueryProcessing(e.to_string()))?;

        Ok(Answer {
            answer,
            sources: hits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;
    use crate::test_support::{ready_record, segment, FakeEmbedder, ScriptedModel};
    use crate::vector_store::{IndexedSegment, MemoryVectorIndex, VectorIndex};

    struct Fixture {
        embedder: Arc<FakeEmbedder>,
        index: Arc<MemoryVectorIndex>,
        model: Arc<ScriptedModel>,
        answerer: QueryAnswerer,
    }

    fn fixture(model: ScriptedModel) -> Fixture {
        let embedder = Arc::new(FakeEmbedder::new(4));
        let index = Arc::new(MemoryVectorIndex::new());
        let model = Arc::new(model);
        let answerer = QueryAnswerer::new(
            Retriever::new(index.clone(), embedder.clone()),
            model.clone(),
        );
        Fixture {
            embedder,
            index,
            model,
            answerer,
        }
    }

    #[tokio::test]
    async fn test_summary_request_short_circuits() {
        let f = fixture(ScriptedModel::replying("unused"));
        let record = ready_record("vid", "It is about crabs.");

        let answer = f.answerer.answer(&record, "give me a SUMMARY").await.unwrap();

        assert_eq!(answer.answer, "Here's a summary of the video:\n\nIt is about crabs.");
        assert!(answer.sources.is_empty());
        assert_eq!(f.model.call_count(), 0);
        assert_eq!(f.embedder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_question() {
        let f = fixture(ScriptedModel::replying("unused"));
        let record = ready_record("vid", "summary");

        for question in ["", "   \n\t"] {
            let answer = f.answerer.answer(&record, question).await.unwrap();
            assert_eq!(answer.answer, EMPTY_QUESTION);
        }
        assert_eq!(f.model.call_count(), 0);
        assert_eq!(f.embedder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_grounded_prompt() {
        let f = fixture(ScriptedModel::replying("Crabs walk sideways."));
        let record = ready_record("vid", "It is about crabs.");

        let item = IndexedSegment::new(segment("vid", "crabs walk sideways", 65.0), vec![1.0; 4]);
        f.index.upsert("yt-vid", &[item]).await.unwrap();

        let answer = f.answerer.answer(&record, "How do crabs walk?").await.unwrap();

        assert_eq!(answer.answer, "Crabs walk sideways.");
        assert_eq!(answer.sources.len(), 1);

        let calls = f.model.calls();
        assert_eq!(calls.len(), 1);
        let system = &calls[0][0];
        assert_eq!(system.role, Role::System);
        assert!(system.content.contains("It is about crabs."));
        assert!(system.content.contains("[00:01:05.00] crabs walk sideways"));
        assert!(system.content.contains("Include timestamps"));
        assert_eq!(calls[0][1], ChatMessage::user("How do crabs walk?"));
    }

    #[tokio::test]
    async fn test_retrieves_top_k() {
        let f = fixture(ScriptedModel::replying("ok"));
        let record = ready_record("vid", "s");

        let items: Vec<IndexedSegment> = (0..12)
            .map(|i| IndexedSegment::new(segment("vid", &format!("s{}", i), i as f64), vec![1.0; 4]))
            .collect();
        f.index.upsert("yt-vid", &items).await.unwrap();

        let answer = f.answerer.answer(&record, "what?").await.unwrap();
        assert_eq!(answer.sources.len(), DEFAULT_TOP_K);
    }

    #[tokio::test]
    async fn test_no_sections_placeholder() {
        let f = fixture(ScriptedModel::replying(""));
        let record = ready_record("vid", "");

        let answer = f.answerer.answer(&record, "anything?").await.unwrap();

        assert_eq!(answer.answer, NO_RESPONSE);
        let system = &f.model.calls()[0][0].content;
        assert!(system.contains("No specific transcript sections found relevant to your query."));
        assert!(system.contains("No summary available."));
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let f = fixture(ScriptedModel::failing());
        let record = ready_record("vid", "s");

        let err = f.answerer.answer(&record, "why?").await.unwrap_err();
        assert!(matches!(err, ClipchatError::QueryProcessing(_)));
    }
}
