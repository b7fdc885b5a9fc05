//! # Report Export
//!
//! Writes finished research to disk:
//! - Markdown: the final report as-is
//! - JSON: the whole `ResearchResult`, rounds included
//!
//! File names are `<safe_topic>_<YYYYmmdd_HHMMSS>.<ext>`.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use research_core::ResearchResult;

/// Longest topic prefix kept in a file name, in characters
const MAX_TOPIC_CHARS: usize = 50;

// =============================================================================
// FILE NAMING
// =============================================================================
/// Make `topic` safe to use in a file name.
///
/// Letters, digits, spaces, `-` and `_` are kept; anything else becomes `_`.
/// The result is trimmed, then cut to 50 characters.
pub fn safe_topic(topic: &str) -> String {
    let cleaned: String = topic
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    cleaned.trim().chars().take(MAX_TOPIC_CHARS).collect()
}

/// `<safe_topic>_<YYYYmmdd_HHMMSS>.<extension>`
pub fn file_name<Tz>(topic: &str, timestamp: &DateTime<Tz>, extension: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}.{}",
        safe_topic(topic),
        timestamp.format("%Y%m%d_%H%M%S"),
        extension
    )
}

// =============================================================================
// EXPORTER
// =============================================================================
/// Writes reports into one output directory
#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the Markdown report, returning its path
    pub fn export_markdown(&self, result: &ResearchResult) -> Result<PathBuf> {
        let path = self.target_path(result, "md")?;

        fs::write(&path, &result.final_report)
            .with_context(|| format!("Failed to write Markdown report to {}", path.display()))?;

        info!(path = %path.display(), "Markdown report exported");
        Ok(path)
    }

    /// Write the full result as pretty-printed JSON, returning its path
    pub fn export_json(&self, result: &ResearchResult) -> Result<PathBuf> {
        let path = self.target_path(result, "json")?;
        let json =
            serde_json::to_string_pretty(result).context("Failed to serialize research result")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write JSON result to {}", path.display()))?;

        info!(path = %path.display(), "JSON result exported");
        Ok(path)
    }

    fn target_path(&self, result: &ResearchResult, extension: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create output directory {}",
                self.output_dir.display()
            )
        })?;

        let local_time = result.timestamp.with_timezone(&Local);
        Ok(self
            .output_dir
            .join(file_name(&result.topic, &local_time, extension)))
    }
}
