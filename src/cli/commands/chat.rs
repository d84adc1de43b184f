//! Interactive chat about one loaded video.

use super::ask::print_answer;
use super::resolve_video_id;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
///
/// Every question is answered on its own; the session keeps nothing but the video ID.
pub async fn run_chat(video: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        Output::info("Run 'clipchat doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let video_id = resolve_video_id(video);

    match orchestrator.video(&video_id).await? {
        Some(record) if record.is_ready() => {}
        _ => {
            Output::error(&format!(
                "Video {} has not been loaded yet. Run 'clipchat load {}' first.",
                video_id, video_id
            ));
            return Ok(());
        }
    }

    println!("\n{} {}", style("Clipchat").bold().cyan(), style(&video_id).dim());
    println!(
        "{}\n",
        style("Type your questions, or 'exit' to quit. Ask for a 'summary' at any time.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        let spinner = Output::spinner("Thinking...");
        let result = orchestrator.answer(&video_id, input).await;
        spinner.finish_and_clear();

        match result {
            Ok(answer) => {
                print!("\n{}", style("Clipchat:").cyan().bold());
                print_answer(&answer);
            }
            Err(e) => Output::error(&format!("Error: {}", e)),
        }
    }

    Ok(())
}
