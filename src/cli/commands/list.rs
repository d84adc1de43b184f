//! List and show command implementations.

use super::resolve_video_id;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    match orchestrator.videos().await {
        Ok(videos) => {
            if videos.is_empty() {
                Output::info("No videos loaded yet. Use 'clipchat load <url>' to add one.");
            } else {
                Output::header(&format!("Loaded Videos ({})", videos.len()));
                println!();

                for record in &videos {
                    Output::video_info(record);
                }

                let total_segments: usize = videos.iter().map(|v| v.segments_indexed).sum();
                println!();
                Output::kv("Total videos", &videos.len().to_string());
                Output::kv("Total segments", &total_segments.to_string());
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list videos: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

/// Run the show command.
pub async fn run_show(video: &str, transcript: bool, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let video_id = resolve_video_id(video);

    let Some(record) = orchestrator.video(&video_id).await? else {
        Output::warning(&format!("Video {} is not known.", video_id));
        return Ok(());
    };

    Output::header(&record.video_id);
    Output::kv("Status", record.status.as_str());
    Output::kv("Segments", &record.segments_indexed.to_string());
    Output::kv("Updated", &record.updated_at.to_rfc3339());

    if !record.is_ready() {
        Output::warning("Loading did not complete. Run 'clipchat load' again.");
        return Ok(());
    }

    Output::header("Summary");
    println!("{}", record.summary);

    if transcript {
        Output::header("Transcript");
        println!("{}", record.full_transcript);
    }

    Ok(())
}
