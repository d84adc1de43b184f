//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod doctor;
mod list;
mod load;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use list::{run_list, run_show};
pub use load::run_load;

use crate::transcript::extract_video_id;

/// Accept either a URL or a bare video ID on the command line.
fn resolve_video_id(input: &str) -> String {
    extract_video_id(input).unwrap_or_else(|| input.trim().to_string())
}
