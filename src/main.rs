//! # note-migrate CLI
//!
//! Reads notes from an SQLite table and writes one Markdown file per note,
//! optionally asking Gemini for a better title.
//!
//! ## Usage
//!
//! ```bash
//! note-migrate [--config migrate.toml] [OPTIONS]
//! ```
//!
//! Settings come from the TOML file when given; every flag below overrides
//! the matching file setting.
//!
//! ## Examples
//!
//! ```bash
//! # Keep the original titles
//! note-migrate --db blocdenotas.db --output notes_md --no-ai
//!
//! # Spanish prompts, key from the environment
//! GEMINI_API_KEY=... note-migrate --db blocdenotas.db -l es
//!
//! # A differently named table
//! note-migrate --table memos --id-column id --body-column content --no-ai
//! ```

use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use note_migrate::config::{self, Config, Language};
use note_migrate::error::MigrationAborted;
use note_migrate::generator;
use note_migrate::logging;
use note_migrate::models::MigrationOutcome;
use note_migrate::pipeline::{Migrator, TokioPacer};
use note_migrate::report;
use note_migrate::source::SqliteSource;

/// Migrate notes from an SQLite database to Markdown files with
/// AI-suggested titles.
#[derive(Parser)]
#[command(name = "note-migrate", version, about)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the SQLite database file [default: blocdenotas.db].
    #[arg(long, short = 'd')]
    db: Option<PathBuf>,

    /// Directory for the Markdown output [default: migrated_notes_md].
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Gemini API key. Falls back to the GEMINI_API_KEY environment variable.
    #[arg(long, short = 'k')]
    api_key: Option<String>,

    /// Notes table name [default: notes].
    #[arg(long)]
    table: Option<String>,

    /// Id column name [default: _id].
    #[arg(long)]
    id_column: Option<String>,

    /// Title column name [default: title].
    #[arg(long)]
    title_column: Option<String>,

    /// Body column name [default: body].
    #[arg(long)]
    body_column: Option<String>,

    /// Creation date column name [default: date].
    #[arg(long)]
    date_column: Option<String>,

    /// Last-updated column name [default: updated_at].
    #[arg(long)]
    updated_column: Option<String>,

    /// Maximum body characters sent to the model [default: 2000].
    #[arg(long)]
    content_limit: Option<usize>,

    /// Seconds to wait after each AI-assisted note [default: 4].
    #[arg(long)]
    delay: Option<f64>,

    /// Keep the original titles; do not call the model.
    #[arg(long)]
    no_ai: bool,

    /// Prompt language.
    #[arg(long, short = 'l', value_enum)]
    language: Option<Language>,

    /// Gemini model name [default: gemini-1.5-flash].
    #[arg(long)]
    model: Option<String>,

    /// Process at most this many notes.
    #[arg(long)]
    limit: Option<usize>,

    /// Print the summary as a single JSON object.
    #[arg(long)]
    json: bool,

    /// Debug-level logging.
    #[arg(long, short = 'v')]
    verbose: bool,
}

impl Cli {
    /// Load the file configuration and apply command-line overrides.
    fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut cfg = config::load_config(self.config.as_deref())?;

        if let Some(db) = &self.db {
            cfg.db.path = db.clone();
        }
        if let Some(output) = &self.output {
            cfg.output.dir = output.clone();
        }

        let source = &mut cfg.source;
        let overrides = [
            (&mut source.table, &self.table),
            (&mut source.id_column, &self.id_column),
            (&mut source.title_column, &self.title_column),
            (&mut source.body_column, &self.body_column),
            (&mut source.created_column, &self.date_column),
            (&mut source.updated_column, &self.updated_column),
        ];
        for (slot, value) in overrides {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }

        let ai = &mut cfg.ai;
        if self.no_ai {
            ai.enabled = false;
        }
        if let Some(key) = &self.api_key {
            ai.api_key = Some(key.clone());
        }
        if let Some(limit) = self.content_limit {
            ai.content_limit = limit;
        }
        if let Some(delay) = self.delay {
            ai.delay_secs = delay;
        }
        if let Some(language) = self.language {
            ai.language = language;
        }
        if let Some(model) = &self.model {
            ai.model = model.clone();
        }
        cfg.ai = cfg.ai.with_env_api_key();

        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose)?;

    let prepared = cli.resolve_config().and_then(|cfg| {
        cfg.validate()?;
        let generator = generator::create_generator(&cfg.ai)?;
        Ok((cfg, generator))
    });
    let (cfg, generator) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            // Nothing ran; report zeroed counters against the requested output dir.
            let output_dir = cli
                .output
                .clone()
                .unwrap_or_else(|| Config::default().output.dir);
            print_summary(
                cli.json,
                &MigrationOutcome::default(),
                &output_dir,
                Some(e.to_string()),
            )?;
            return Err(e);
        }
    };
    match &generator {
        Some(g) => info!(model = g.model_name(), "AI titles enabled"),
        None => info!("AI disabled; using original titles"),
    }

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received; finishing the current note");
                cancel.store(true, Ordering::SeqCst);
            }
        });
    }

    let source = SqliteSource::new(&cfg.db.path);
    let pacer = TokioPacer;
    let mut migrator = Migrator::new(&cfg, &source, &pacer)
        .with_cancel_flag(cancel)
        .with_limit(cli.limit);
    if let Some(g) = generator.as_deref() {
        migrator = migrator.with_generator(g);
    }

    info!(db = %cfg.db.path.display(), output = %cfg.output.dir.display(), "starting migration");
    let (outcome, fatal) = match migrator.run().await {
        Ok(outcome) => (outcome, None),
        Err(MigrationAborted { outcome, cause }) => (outcome, Some(cause)),
    };

    print_summary(
        cli.json,
        &outcome,
        &cfg.output.dir,
        fatal.as_ref().map(|e| e.to_string()),
    )?;

    match fatal {
        Some(cause) => Err(cause.into()),
        None => Ok(()),
    }
}

fn print_summary(
    json: bool,
    outcome: &MigrationOutcome,
    output_dir: &Path,
    error: Option<String>,
) -> anyhow::Result<()> {
    let output_dir = report::absolute_output_dir(output_dir);
    if json {
        println!(
            "{}",
            report::render_summary_json(outcome, &output_dir, error.as_deref())?
        );
    } else {
        print!("{}", report::render_summary(outcome, &output_dir));
    }
    Ok(())
}
