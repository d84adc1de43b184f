//! Config command: inspect and edit the active settings file.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Run the config command against `--config` if given, else the default file.
pub fn run_config(action: &ConfigAction, settings: Settings, config: Option<&str>) -> Result<()> {
    let path = config_path(config);

    match action {
        ConfigAction::Show => {
            let source = if path.exists() {
                path.display().to_string()
            } else {
                "built-in defaults".to_string()
            };
            Output::info(&format!("Effective settings ({})", source));
            println!("{}", render(&settings)?);
        }

        ConfigAction::Edit => {
            if !path.exists() {
                settings
                    .save_to(&path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                Output::info(&format!("Wrote defaults to {}", path.display()));
            }

            let editor = editor_command(std::env::var("VISUAL").ok(), std::env::var("EDITOR").ok());
            let status = std::process::Command::new(&editor)
                .arg(&path)
                .status()
                .with_context(|| format!("Failed to start editor '{}'", editor))?;
            if !status.success() {
                anyhow::bail!("{} exited with {}", editor, status);
            }

            // Catch typos before the next command trips over them.
            Settings::load_from(Some(&path))
                .with_context(|| format!("{} no longer parses", path.display()))?;
            Output::success("Config saved.");
        }

        ConfigAction::Path => println!("{}", path.display()),
    }

    Ok(())
}

fn config_path(config: Option<&str>) -> PathBuf {
    config
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path)
}

fn render(settings: &Settings) -> Result<String> {
    toml::to_string_pretty(settings).context("Failed to serialize settings")
}

/// `$VISUAL`, then `$EDITOR`, then `vi`. Blank values are skipped.
fn editor_command(visual: Option<String>, editor: Option<String>) -> String {
    [visual, editor]
        .into_iter()
        .flatten()
        .map(|e| e.trim().to_string())
        .find(|e| !e.is_empty())
        .unwrap_or_else(|| "vi".to_string())
}
