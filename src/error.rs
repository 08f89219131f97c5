//! Error types for run-level failures.
//!
//! Only these abort a migration. Per-note problems (generator failures,
//! unusable suggestions, write errors) are counted in
//! [`MigrationOutcome`](crate::models::MigrationOutcome) instead.

use std::path::PathBuf;
use thiserror::Error;

use crate::models::MigrationOutcome;

/// Failures while extracting notes from the record source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("database file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("could not open database {}: {source}", path.display())]
    Connect {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    #[error("query on table '{table}' failed (check the table and column names): {source}")]
    Query {
        table: String,
        #[source]
        source: sqlx::Error,
    },
}

/// Anything that stops a run before or during extraction.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("could not create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A run that was aborted, with the counters accumulated until then.
#[derive(Debug, Error)]
#[error("migration aborted: {cause}")]
pub struct MigrationAborted {
    pub outcome: MigrationOutcome,
    #[source]
    pub cause: FatalError,
}
