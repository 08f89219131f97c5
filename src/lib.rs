//! # note-migrate
//!
//! Migrates notes stored in an SQLite table into one Markdown file per note,
//! optionally asking a Gemini model for a better title.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────────────────┐   ┌────────────┐
//! │ RecordSource │──▶│           Migrator           │──▶│  Markdown  │
//! │   (SQLite)   │   │  resolve → render → write    │   │   files    │
//! └──────────────┘   └──────────────┬───────────────┘   └────────────┘
//!                                   │
//!                                   ▼
//!                          ┌──────────────────┐
//!                          │  TextGenerator   │
//!                          │    (Gemini)      │
//!                          └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! note-migrate --db blocdenotas.db --output notes_md --no-ai
//! GEMINI_API_KEY=... note-migrate --db blocdenotas.db --language es
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and validation |
//! | [`models`] | Core data types |
//! | [`source`] | Record source trait and SQLite adapter |
//! | [`generator`] | Text generator trait and Gemini client |
//! | [`suggest`] | Title suggestion rules |
//! | [`document`] | Markdown rendering and atomic writes |
//! | [`pipeline`] | Migration orchestration |
//! | [`sanitize`] | Filename sanitization |
//! | [`timestamp`] | Timestamp formatting |
//! | [`report`] | End-of-run summary |
//! | [`error`] | Run-level error types |
//! | [`db`] | Database connection |

pub mod config;
pub mod db;
pub mod document;
pub mod error;
pub mod generator;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod sanitize;
pub mod source;
pub mod suggest;
pub mod timestamp;
