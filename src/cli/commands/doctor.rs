//! Doctor command: can clipchat load and answer with the current settings?

use crate::cli::preflight::tool_version;
use crate::cli::Output;
use crate::config::{Settings, StoreProvider, TranscriptProviderKind};
use console::style;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Ok,
    Warn,
    Fail,
}

/// One diagnostic line.
#[derive(Debug)]
struct Finding {
    level: Level,
    label: &'static str,
    detail: String,
    hint: Option<&'static str>,
}

impl Finding {
    fn ok(label: &'static str, detail: impl Into<String>) -> Self {
        Self {
            level: Level::Ok,
            label,
            detail: detail.into(),
            hint: None,
        }
    }

    fn warn(label: &'static str, detail: impl Into<String>, hint: &'static str) -> Self {
        Self {
            level: Level::Warn,
            label,
            detail: detail.into(),
            hint: Some(hint),
        }
    }

    fn fail(label: &'static str, detail: impl Into<String>, hint: &'static str) -> Self {
        Self {
            level: Level::Fail,
            label,
            detail: detail.into(),
            hint: Some(hint),
        }
    }
}

/// Run all diagnostic checks. Fails when any check fails.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Clipchat Doctor");

    let sections = [
        ("Transcripts", transcript_findings(settings)),
        ("OpenAI", vec![api_key_finding(std::env::var("OPENAI_API_KEY").ok())]),
        ("Settings", settings_findings(settings)),
        ("Storage", storage_findings(settings)),
    ];

    for (title, findings) in &sections {
        println!("\n{}", style(title).bold());
        for finding in findings {
            print_finding(finding);
        }
    }
    println!();

    let count = |level: Level| {
        sections
            .iter()
            .flat_map(|(_, findings)| findings)
            .filter(|f| f.level == level)
            .count()
    };

    match (count(Level::Fail), count(Level::Warn)) {
        (0, 0) => Output::success("Everything looks good."),
        (0, warnings) => Output::warning(&format!("Usable, with {} warning(s).", warnings)),
        (failures, _) => anyhow::bail!("{} check(s) failed", failures),
    }

    Ok(())
}

fn print_finding(finding: &Finding) {
    let icon = match finding.level {
        Level::Ok => style("✓").green(),
        Level::Warn => style("!").yellow(),
        Level::Fail => style("✗").red(),
    };
    println!("  {} {} - {}", icon, style(finding.label).bold(), finding.detail);
    if let Some(hint) = finding.hint {
        println!("    {} {}", style("→").dim(), style(hint).dim());
    }
}

/// The configured transcript source must be reachable.
fn transcript_findings(settings: &Settings) -> Vec<Finding> {
    match settings.transcript.provider {
        TranscriptProviderKind::Youtube => match tool_version("yt-dlp") {
            Ok(version) => vec![Finding::ok("yt-dlp", truncate(&version, 50))],
            Err(e) => vec![Finding::fail(
                "yt-dlp",
                e.to_string(),
                "Install with: pip install yt-dlp (or your package manager)",
            )],
        },
        TranscriptProviderKind::File => vec![transcript_dir_finding(&settings.transcript_dir())],
    }
}

fn transcript_dir_finding(dir: &Path) -> Finding {
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            let files = entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
                .count();
            Finding::ok(
                "Transcript dir",
                format!("{} ({} transcripts)", dir.display(), files),
            )
        }
        Err(_) => Finding::fail(
            "Transcript dir",
            format!("{} does not exist", dir.display()),
            "Create it and add <video_id>.json files, or set transcript.dir",
        ),
    }
}

fn api_key_finding(key: Option<String>) -> Finding {
    match key {
        Some(key) if !key.is_empty() => Finding::ok("OPENAI_API_KEY", mask(&key)),
        _ => Finding::fail(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

/// Largest vector length each known embedding model can return.
fn max_dimensions(model: &str) -> Option<u32> {
    match model {
        "text-embedding-3-small" | "text-embedding-ada-002" => Some(1536),
        "text-embedding-3-large" => Some(3072),
        _ => None,
    }
}

/// Values that would make loading or answering fail or misbehave.
fn settings_findings(settings: &Settings) -> Vec<Finding> {
    let mut findings = Vec::new();

    let embedding = &settings.embedding;
    findings.push(match max_dimensions(&embedding.model) {
        Some(max) if embedding.dimensions == 0 || embedding.dimensions > max => Finding::fail(
            "Embedding dimensions",
            format!("{} is outside 1..={} for {}", embedding.dimensions, max, embedding.model),
            "Adjust embedding.dimensions",
        ),
        Some(max) if embedding.model == "text-embedding-ada-002" && embedding.dimensions != max => {
            Finding::fail(
                "Embedding dimensions",
                format!("{} always returns {} dimensions", embedding.model, max),
                "Set embedding.dimensions = 1536",
            )
        }
        Some(_) => Finding::ok(
            "Embedding dimensions",
            format!("{} ({})", embedding.dimensions, embedding.model),
        ),
        None => Finding::warn(
            "Embedding dimensions",
            format!("unknown model {}", embedding.model),
            "Every vector of the wrong length is dropped at load time",
        ),
    });

    findings.push(if embedding.batch_size == 0 {
        Finding::warn(
            "Batch size",
            "0, segments will be uploaded one at a time",
            "Set embedding.batch_size (default 100)",
        )
    } else {
        Finding::ok("Batch size", embedding.batch_size.to_string())
    });

    findings.push(if settings.rag.top_k == 0 {
        Finding::warn(
            "Top K",
            "0, one segment will be retrieved per question",
            "Set rag.top_k (default 8)",
        )
    } else {
        Finding::ok("Top K", settings.rag.top_k.to_string())
    });

    findings.push(if (0.0..=2.0).contains(&settings.llm.temperature) {
        Finding::ok("Model", format!("{} (temperature {})", settings.llm.model, settings.llm.temperature))
    } else {
        Finding::fail(
            "Model",
            format!("temperature {} is outside 0..=2", settings.llm.temperature),
            "Adjust llm.temperature",
        )
    });

    findings
}

fn storage_findings(settings: &Settings) -> Vec<Finding> {
    let stores = [
        ("Vector index", settings.vector_store.provider, settings.vector_store_path()),
        ("Video store", settings.video_store.provider, settings.video_store_path()),
    ];

    stores
        .into_iter()
        .map(|(label, provider, path)| match provider {
            StoreProvider::Memory => Finding::warn(
                label,
                "in memory, nothing persists between commands",
                "Use provider = \"sqlite\" so 'ask' can see what 'load' stored",
            ),
            StoreProvider::Sqlite => match std::fs::metadata(&path) {
                Ok(meta) => Finding::ok(label, format!("{} ({} KB)", path.display(), meta.len() / 1024)),
                Err(_) => Finding::ok(label, format!("{} (created on first load)", path.display())),
            },
        })
        .collect()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Show only the first seven and last four characters of a secret.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 11 {
        return "configured".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("configured ({}...{})", head, tail)
}
