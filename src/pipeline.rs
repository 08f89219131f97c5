//! Migration pipeline orchestration.
//!
//! Coordinates the full run: record source → title resolution → Markdown
//! rendering → atomic write → optional pause. Notes are handled strictly one
//! at a time. Only extraction and output-directory failures abort a run;
//! everything that goes wrong for a single note is logged, counted in
//! [`MigrationOutcome`], and the run moves on.
//!
//! ```text
//!  Fetched ──empty body──▶ SkippedEmpty
//!     │
//!     ▼
//!  TitleResolving ──▶ Formatted ──▶ Written
//!                                └─▶ WriteFailed
//! ```

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::{AiConfig, Config};
use crate::document::{render_document, synthetic_title, write_document};
use crate::error::{FatalError, MigrationAborted};
use crate::generator::TextGenerator;
use crate::models::{MigrationOutcome, NoteRecord, TitleResolution};
use crate::source::RecordSource;
use crate::suggest::{suggest_title, Suggestion};

/// Longest title preview written to the progress log, in characters.
const TITLE_PREVIEW_LEN: usize = 60;

/// Pause between AI-assisted notes.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// [`Pacer`] backed by `tokio::time::sleep`.
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// A title decision plus whether the generator failed on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTitle {
    pub resolution: TitleResolution,
    /// The generator returned an error and the title fell back.
    pub service_failed: bool,
}

/// Decide the title for one note.
///
/// With no generator the original title is kept as is, even when blank.
/// With one, a usable suggestion wins; invalid replies and generator errors
/// keep the original, or `Imported_Note_<id>` when the original is blank.
pub async fn resolve_title(
    note: &NoteRecord,
    generator: Option<&dyn TextGenerator>,
    ai: &AiConfig,
) -> ResolvedTitle {
    let Some(generator) = generator else {
        return ResolvedTitle {
            resolution: TitleResolution::UseOriginal(note.title.clone()),
            service_failed: false,
        };
    };

    let suggestion = suggest_title(
        generator,
        &note.title,
        &note.body,
        ai.content_limit,
        ai.language,
    )
    .await;

    match suggestion {
        Suggestion::Generated(title) => ResolvedTitle {
            resolution: TitleResolution::UseGenerated(title),
            service_failed: false,
        },
        Suggestion::Invalid(_) | Suggestion::NoSuggestion => ResolvedTitle {
            resolution: original_or_synthetic(note),
            service_failed: false,
        },
        Suggestion::ServiceError(_) => ResolvedTitle {
            resolution: original_or_synthetic(note),
            service_failed: true,
        },
    }
}

fn original_or_synthetic(note: &NoteRecord) -> TitleResolution {
    if note.title.trim().is_empty() {
        TitleResolution::UseSyntheticFallback(synthetic_title(&note.id))
    } else {
        TitleResolution::UseOriginal(note.title.clone())
    }
}

fn title_preview(title: &str) -> String {
    if title.chars().count() > TITLE_PREVIEW_LEN {
        let cut: String = title.chars().take(TITLE_PREVIEW_LEN).collect();
        format!("{}...", cut)
    } else {
        title.to_string()
    }
}

/// Drives one migration run.
///
/// The generator and pacer are injected; nothing here talks to the network
/// or sleeps on its own.
pub struct Migrator<'a> {
    config: &'a Config,
    source: &'a dyn RecordSource,
    pacer: &'a dyn Pacer,
    generator: Option<&'a dyn TextGenerator>,
    cancel: Option<Arc<AtomicBool>>,
    limit: Option<usize>,
}

impl<'a> Migrator<'a> {
    pub fn new(config: &'a Config, source: &'a dyn RecordSource, pacer: &'a dyn Pacer) -> Self {
        Self {
            config,
            source,
            pacer,
            generator: None,
            cancel: None,
            limit: None,
        }
    }

    /// Use `generator` for titles. Ignored when `ai.enabled` is false.
    pub fn with_generator(mut self, generator: &'a dyn TextGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Stop before the next note once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Process at most `limit` notes.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    fn active_generator(&self) -> Option<&'a dyn TextGenerator> {
        self.generator.filter(|_| self.config.ai.enabled)
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Run the migration.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationAborted`] when the output directory cannot be
    /// created or the source cannot be read. The counters gathered up to
    /// that point travel with the error.
    pub async fn run(&self) -> Result<MigrationOutcome, MigrationAborted> {
        let mut outcome = MigrationOutcome::default();
        let output_dir = &self.config.output.dir;

        if let Err(source) = std::fs::create_dir_all(output_dir) {
            return Err(MigrationAborted {
                outcome,
                cause: FatalError::OutputDir {
                    path: output_dir.clone(),
                    source,
                },
            });
        }

        let notes = match self.source.fetch_all(&self.config.source).await {
            Ok(notes) => notes,
            Err(e) => {
                return Err(MigrationAborted {
                    outcome,
                    cause: e.into(),
                })
            }
        };

        outcome.total_found = notes.len();
        info!(total = notes.len(), table = %self.config.source.table, "found notes");

        let generator = self.active_generator();
        let delay = self.config.ai.delay();
        let total = self.limit.map_or(notes.len(), |l| l.min(notes.len()));

        for (i, note) in notes.iter().take(total).enumerate() {
            if self.cancelled() {
                warn!(remaining = total - i, "cancellation requested; stopping");
                outcome.interrupted = true;
                break;
            }

            info!(
                n = i + 1,
                total,
                id = %note.id,
                title = %title_preview(&note.title),
                "processing note"
            );

            if !note.has_content() {
                info!(id = %note.id, "empty body; skipping");
                outcome.skipped_empty += 1;
                continue;
            }

            let resolved = resolve_title(note, generator, &self.config.ai).await;
            if resolved.service_failed {
                outcome.suggestion_fallbacks += 1;
            }
            debug!(
                id = %note.id,
                kind = resolved.resolution.kind(),
                title = %resolved.resolution.title(),
                "title resolved"
            );

            let document = render_document(note, &resolved.resolution);
            match write_document(output_dir, &document) {
                Ok(_) => {
                    info!(file = %document.filename, "saved");
                    outcome.processed += 1;
                }
                Err(e) => {
                    error!(file = %document.filename, error = %e, "failed to write note");
                    outcome.write_errors += 1;
                }
            }

            if generator.is_some() && !delay.is_zero() {
                self.pacer.pause(delay).await;
            }
        }

        Ok(outcome)
    }
}
