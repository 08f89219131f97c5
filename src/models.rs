//! Core data models that flow through the migration pipeline.
//!
//! A [`NoteRecord`] is read from the source, its title is decided as a
//! [`TitleResolution`], and the result is rendered into an
//! [`OutputDocument`]. Run-level counters live in [`MigrationOutcome`].

use serde::Serialize;

/// A note as read from the source table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    /// Identifier rendered as text. Unique and used as the ordering key.
    pub id: String,
    /// Original title; empty when the column was NULL.
    pub title: String,
    /// Note content; empty when the column was NULL.
    pub body: String,
    /// Creation date exactly as stored.
    pub created: Option<String>,
    /// Last update as epoch seconds.
    pub updated: Option<i64>,
}

impl NoteRecord {
    /// Whether the body has anything besides whitespace.
    pub fn has_content(&self) -> bool {
        !self.body.trim().is_empty()
    }
}

/// The title decided for one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleResolution {
    /// Title proposed by the text generator.
    UseGenerated(String),
    /// The note's own title.
    UseOriginal(String),
    /// `Imported_Note_<id>`, used when no other title is usable.
    UseSyntheticFallback(String),
}

impl TitleResolution {
    pub fn title(&self) -> &str {
        match self {
            TitleResolution::UseGenerated(t)
            | TitleResolution::UseOriginal(t)
            | TitleResolution::UseSyntheticFallback(t) => t,
        }
    }

    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            TitleResolution::UseGenerated(_) => "generated",
            TitleResolution::UseOriginal(_) => "original",
            TitleResolution::UseSyntheticFallback(_) => "fallback",
        }
    }
}

/// Counters for a single migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationOutcome {
    pub total_found: usize,
    pub processed: usize,
    pub skipped_empty: usize,
    /// Notes whose title fell back because the generator failed.
    pub suggestion_fallbacks: usize,
    pub write_errors: usize,
    /// Set when a cancellation request stopped the run early.
    pub interrupted: bool,
}

/// A rendered note, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDocument {
    pub filename: String,
    pub content: String,
}
