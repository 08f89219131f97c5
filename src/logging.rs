//! Logging setup for the `note-migrate` binary.
//!
//! Log lines go to stderr. `RUST_LOG` or `NOTE_MIGRATE_LOG` override the
//! level chosen from the command line.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "NOTE_MIGRATE_LOG";

/// Default filter directive for the given verbosity.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "note_migrate=debug"
    } else {
        "note_migrate=info"
    }
}

/// Install the global subscriber.
pub fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env(LOG_ENV))
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()?;

    Ok(())
}
