//! End-of-run summary.
//!
//! The summary goes to **stdout** (human text or one JSON object) so it can
//! be captured by scripts; progress logging stays on stderr.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::models::MigrationOutcome;

#[derive(Debug, Serialize)]
struct SummaryJson<'a> {
    #[serde(flatten)]
    outcome: &'a MigrationOutcome,
    output_dir: String,
    error: Option<String>,
}

/// Absolute form of the output directory, falling back to the path as given.
pub fn absolute_output_dir(dir: &Path) -> PathBuf {
    std::fs::canonicalize(dir)
        .or_else(|_| std::path::absolute(dir))
        .unwrap_or_else(|_| dir.to_path_buf())
}

pub fn render_summary(outcome: &MigrationOutcome, output_dir: &Path) -> String {
    let mut out = String::from("--- Summary ---\n");
    out.push_str(&format!("Total notes found: {}\n", outcome.total_found));
    out.push_str(&format!("Notes processed: {}\n", outcome.processed));
    out.push_str(&format!("Notes skipped (empty): {}\n", outcome.skipped_empty));
    out.push_str(&format!(
        "API errors (fallback): {}\n",
        outcome.suggestion_fallbacks
    ));
    out.push_str(&format!("File errors: {}\n", outcome.write_errors));
    if outcome.interrupted {
        out.push_str("Interrupted before all notes were processed\n");
    }
    out.push_str(&format!(
        "Markdown files saved at: {}\n",
        output_dir.display()
    ));
    out
}

pub fn render_summary_json(
    outcome: &MigrationOutcome,
    output_dir: &Path,
    error: Option<&str>,
) -> serde_json::Result<String> {
    serde_json::to_string(&SummaryJson {
        outcome,
        output_dir: output_dir.display().to_string(),
        error: error.map(str::to_string),
    })
}
