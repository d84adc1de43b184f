//! Whole-video summarization over a bounded sample of segments.

use crate::error::ClipchatError;
use crate::llm::{complete_with_policy, ChatMessage, FailurePolicy, LanguageModel};
use crate::transcript::Segment;
use std::sync::Arc;
use tracing::{info, instrument};

/// Returned when there is nothing to summarize.
pub const SUMMARY_UNAVAILABLE: &str = "No transcript content available to summarize.";
/// Returned when the model answers with an empty response.
pub const SUMMARY_EMPTY: &str = "Unable to generate summary.";
/// Returned when the model call fails.
pub const SUMMARY_FAILED: &str = "An error occurred while generating the summary.";

/// Transcripts longer than this are sampled instead of sent whole.
const SAMPLE_THRESHOLD: usize = 50;
/// Segments taken from each of the head, middle and tail.
const SAMPLE_WINDOW: usize = 10;

/// Pick the segments to summarize: all of them for short transcripts, otherwise the
/// first ten, the ten around the midpoint and the last ten, in that order.
///
/// Above the threshold the three windows never overlap.
pub fn sample_segments(segments: &[Segment]) -> Vec<&Segment> {
    let n = segments.len();
    if n <= SAMPLE_THRESHOLD {
        return segments.iter().collect();
    }

    let half = SAMPLE_WINDOW / 2;
    let mid = n / 2;

    segments[..SAMPLE_WINDOW]
        .iter()
        .chain(&segments[mid - half..mid + half])
        .chain(&segments[n - SAMPLE_WINDOW..])
        .collect()
}

/// Produces prose summaries; never fails.
pub struct Summarizer {
    model: Arc<dyn LanguageModel>,
    system_prompt: String,
}

impl Summarizer {
    pub fn new(model: Arc<dyn LanguageModel>, system_prompt: impl Into<String>) -> Self {
        Self {
            model,
            system_prompt: system_prompt.into(),
        }
    }

    /// Summarize a video's segments.
    #[instrument(skip(self, segments), fields(count = segments.len()))]
    pub async fn summarize(&self, video_id: &str, segments: &[Segment]) -> String {
        if segments.is_empty() {
            return SUMMARY_UNAVAILABLE.to_string();
        }

        let sampled = sample_segments(segments);
        let block = sampled
            .iter()
            .map(|s| s.as_line())
            .collect::<Vec<_>>()
            .join("\n");

        if block.trim().is_empty() {
            return SUMMARY_UNAVAILABLE.to_string();
        }

        info!(
            "Summarizing {} of {} segments for {}",
            sampled.len(),
            segments.len(),
            video_id
        );

        let messages = [
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(block),
        ];

        let result = complete_with_policy(
            self.model.as_ref(),
            &messages,
            SUMMARY_EMPTY,
            &FailurePolicy::Propagate,
        )
        .await
        .map_err(|e| ClipchatError::SummaryGeneration(e.to_string()));

        // Recover never yields Err
        FailurePolicy::recover(SUMMARY_FAILED)
            .resolve(result)
            .unwrap_or_else(|_| SUMMARY_FAILED.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;
    use crate::test_support::{segments, ScriptedModel};

    fn summarizer(model: &Arc<ScriptedModel>) -> Summarizer {
        Summarizer::new(model.clone(), "Summarize this.")
    }

    #[test]
    fn test_sample_large_transcript() {
        let all = segments("v", 120);
        let sampled = sample_segments(&all);

        let expected: Vec<String> = (0..10)
            .chain(55..65)
            .chain(110..120)
            .map(|i| format!("segment {}", i))
            .collect();
        let actual: Vec<String> = sampled.iter().map(|s| s.text.clone()).collect();

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_sample_small_transcript_keeps_everything() {
        let all = segments("v", 50);
        assert_eq!(sample_segments(&all).len(), 50);

        let all = segments("v", 51);
        let sampled = sample_segments(&all);
        assert_eq!(sampled.len(), 30);
        assert_eq!(sampled[10].text, "segment 20");
        assert_eq!(sampled[20].text, "segment 41");
    }

    #[tokio::test]
    async fn test_empty_transcript_skips_model() {
        let model = Arc::new(ScriptedModel::replying("unused"));
        let summary = summarizer(&model).summarize("v", &[]).await;

        assert_eq!(summary, SUMMARY_UNAVAILABLE);
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_prompt_shape() {
        let model = Arc::new(ScriptedModel::replying("A video about things."));
        let summary = summarizer(&model).summarize("v", &segments("v", 2)).await;

        assert_eq!(summary, "A video about things.");
        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 2);
        assert_eq!(calls[0][0].role, Role::System);
        assert_eq!(calls[0][0].content, "Summarize this.");
        assert_eq!(calls[0][1].role, Role::User);
        assert_eq!(
            calls[0][1].content,
            "[00:00:00.00] segment 0\n[00:00:01.00] segment 1"
        );
    }

    #[tokio::test]
    async fn test_empty_response_and_failure_fallbacks() {
        let model = Arc::new(ScriptedModel::replying(""));
        let summary = summarizer(&model).summarize("v", &segments("v", 3)).await;
        assert_eq!(summary, SUMMARY_EMPTY);

        let model = Arc::new(ScriptedModel::failing());
        let summary = summarizer(&model).summarize("v", &segments("v", 3)).await;
        assert_eq!(summary, SUMMARY_FAILED);
        assert_eq!(model.call_count(), 1);
    }
}
