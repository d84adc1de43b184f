//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::TranscriptProviderKind;
use crate::error::{ClipchatError, Result};
use crate::openai::is_api_key_configured;
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Loading needs the API key, plus yt-dlp for YouTube captions.
    Load(TranscriptProviderKind),
    /// Asking questions requires the API key.
    Ask,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Load(provider) => {
            check_api_key()?;
            if provider == TranscriptProviderKind::Youtube {
                check_tool("yt-dlp")?;
            }
        }
        Operation::Ask => {
            check_api_key()?;
        }
    }
    Ok(())
}

fn check_api_key() -> Result<()> {
    if is_api_key_configured() {
        Ok(())
    } else {
        Err(ClipchatError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        ))
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    tool_version(name).map(|_| ())
}

/// First line of `<name> --version`.
pub(crate) fn tool_version(name: &str) -> Result<String> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or("installed")
            .trim()
            .to_string()),
        Ok(_) => Err(ClipchatError::ToolFailed(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ClipchatError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(ClipchatError::ToolFailed(format!("{}: {}", name, e))),
    }
}
