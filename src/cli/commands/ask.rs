//! Ask command implementation.

use super::resolve_video_id;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::rag::Answer;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(video: &str, question: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        Output::info("Run 'clipchat doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let video_id = resolve_video_id(video);

    let spinner = Output::spinner("Searching transcript...");
    let result = orchestrator.answer(&video_id, question).await;
    spinner.finish_and_clear();

    match result {
        Ok(answer) => print_answer(&answer),
        Err(e) if e.is_not_found() => {
            Output::error(&format!(
                "Video {} has not been loaded yet. Run 'clipchat load {}' first.",
                video_id, video_id
            ));
            return Err(e.into());
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

/// Print an answer followed by the segments it was grounded on.
pub(super) fn print_answer(answer: &Answer) {
    println!("\n{}\n", answer.answer);

    if !answer.sources.is_empty() {
        Output::header("Sources");
        for source in &answer.sources {
            Output::source(&source.segment.timestamp, source.score, &source.segment.text);
        }
        println!();
    }
}
