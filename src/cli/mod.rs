//! CLI module for Clipchat.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::config::TranscriptProviderKind;
use clap::{Parser, Subcommand};

/// Clipchat - chat with the transcript of a video
///
/// Load a video once, then ask questions answered from what is actually said in it.
#[derive(Parser, Debug)]
#[command(name = "clipchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "CLIPCHAT_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check system requirements and configuration
    Doctor,

    /// Load a video: fetch its transcript, index it and summarize it
    Load {
        /// YouTube URL or video ID
        url: String,

        /// Transcript provider to use instead of the configured one (youtube, file)
        #[arg(short, long)]
        provider: Option<TranscriptProviderKind>,
    },

    /// Ask one question about a loaded video
    Ask {
        /// Video ID (or URL) of a loaded video
        video: String,

        /// The question to ask
        question: String,
    },

    /// Start an interactive chat about a loaded video
    Chat {
        /// Video ID (or URL) of a loaded video
        video: String,
    },

    /// List loaded videos
    List,

    /// Show the summary and transcript of a loaded video
    Show {
        /// Video ID (or URL)
        video: String,

        /// Print the full transcript as well
        #[arg(short, long)]
        transcript: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_load_with_provider() {
        let cli = Cli::parse_from(["clipchat", "-vv", "load", "dQw4w9WgXcQ", "--provider", "file"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Load { url, provider } => {
                assert_eq!(url, "dQw4w9WgXcQ");
                assert_eq!(provider, Some(TranscriptProviderKind::File));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_show() {
        let cli = Cli::parse_from(["clipchat", "show", "dQw4w9WgXcQ", "--transcript"]);
        match cli.command {
            Commands::Show { video, transcript } => {
                assert_eq!(video, "dQw4w9WgXcQ");
                assert!(transcript);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
