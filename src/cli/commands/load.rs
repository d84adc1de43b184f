//! Load command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Settings, TranscriptProviderKind};
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the load command.
pub async fn run_load(
    url: &str,
    provider: Option<TranscriptProviderKind>,
    mut settings: Settings,
) -> Result<()> {
    if let Some(provider) = provider {
        settings.transcript.provider = provider;
    }

    if let Err(e) = preflight::check(Operation::Load(settings.transcript.provider)) {
        Output::error(&format!("{}", e));
        Output::info("Run 'clipchat doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Fetching transcript, indexing and summarizing...");
    let result = orchestrator.ingest(url).await;
    spinner.finish_and_clear();

    match result {
        Ok(result) => {
            Output::success(&format!("Loaded {}", result.video_id));
            Output::kv("Segments indexed", &result.segments_indexed.to_string());
            if result.segments_rejected > 0 {
                Output::warning(&format!(
                    "{} segments were skipped because of invalid embeddings",
                    result.segments_rejected
                ));
            }

            Output::header("Summary");
            println!("{}\n", result.summary);
            Output::info(&format!(
                "Ask questions with: clipchat chat {}",
                result.video_id
            ));
        }
        Err(e) => {
            Output::error(&format!("Failed to load video: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
