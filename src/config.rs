//! Migration configuration.
//!
//! A [`Config`] is built once (from an optional TOML file plus CLI
//! overrides), validated, and then passed by reference into the pipeline.
//! Every section is optional in the file; missing keys fall back to the
//! defaults used by common Android note-taking apps.
//!
//! ```toml
//! [db]
//! path = "blocdenotas.db"
//!
//! [output]
//! dir = "migrated_notes_md"
//!
//! [source]
//! table = "notes"
//! id_column = "_id"
//!
//! [ai]
//! enabled = true
//! language = "es"
//! delay_secs = 4.0
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable consulted for the Gemini credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("blocdenotas.db")
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("migrated_notes_md")
}

/// Table and column names of the notes table.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_id_column")]
    pub id_column: String,
    #[serde(default = "default_title_column")]
    pub title_column: String,
    #[serde(default = "default_body_column")]
    pub body_column: String,
    #[serde(default = "default_created_column")]
    pub created_column: String,
    #[serde(default = "default_updated_column")]
    pub updated_column: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            id_column: default_id_column(),
            title_column: default_title_column(),
            body_column: default_body_column(),
            created_column: default_created_column(),
            updated_column: default_updated_column(),
        }
    }
}

fn default_table() -> String {
    "notes".to_string()
}
fn default_id_column() -> String {
    "_id".to_string()
}
fn default_title_column() -> String {
    "title".to_string()
}
fn default_body_column() -> String {
    "body".to_string()
}
fn default_created_column() -> String {
    "date".to_string()
}
fn default_updated_column() -> String {
    "updated_at".to_string()
}

impl SourceConfig {
    /// `(setting, value)` pairs for every configured identifier.
    fn identifiers(&self) -> [(&'static str, &str); 6] {
        [
            ("source.table", self.table.as_str()),
            ("source.id_column", self.id_column.as_str()),
            ("source.title_column", self.title_column.as_str()),
            ("source.body_column", self.body_column.as_str()),
            ("source.created_column", self.created_column.as_str()),
            ("source.updated_column", self.updated_column.as_str()),
        ]
    }
}

/// Prompt language for title suggestions.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Maximum body characters sent to the model. `0` sends the whole body.
    #[serde(default = "default_content_limit")]
    pub content_limit: usize,
    /// Pause after every AI-assisted note, in seconds.
    #[serde(default = "default_delay_secs")]
    pub delay_secs: f64,
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            model: default_model(),
            base_url: default_base_url(),
            content_limit: default_content_limit(),
            delay_secs: default_delay_secs(),
            language: Language::default(),
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
            api_key: None,
        }
    }
}

fn default_enabled() -> bool {
    true
}
fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_content_limit() -> usize {
    2000
}
fn default_delay_secs() -> f64 {
    4.0
}
fn default_timeout_secs() -> u64 {
    30
}

impl AiConfig {
    /// The inter-call pause. Invalid values collapse to zero; [`Config::validate`]
    /// rejects them before a run starts.
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_secs).unwrap_or(Duration::ZERO)
    }

    /// Fill `api_key` from the environment when it is not already set.
    pub fn with_env_api_key(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = std::env::var(API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty());
        }
        self
    }
}

impl Config {
    /// Check the settings that would otherwise fail mid-run.
    pub fn validate(&self) -> Result<()> {
        for (setting, value) in self.source.identifiers() {
            if value.trim().is_empty() {
                bail!("{} must not be empty", setting);
            }
        }

        if !self.ai.delay_secs.is_finite() || self.ai.delay_secs < 0.0 {
            bail!("ai.delay_secs must be a non-negative number of seconds");
        }

        if self.ai.enabled {
            if self.ai.model.trim().is_empty() {
                bail!("ai.model must be specified when AI titles are enabled");
            }
            let has_key = self
                .ai
                .api_key
                .as_deref()
                .is_some_and(|key| !key.trim().is_empty());
            if !has_key {
                bail!(
                    "No API key provided for Gemini. Pass --api-key, set {}, \
                     or use --no-ai to keep the original titles.",
                    API_KEY_ENV
                );
            }
        }

        Ok(())
    }
}

/// Load configuration from a TOML file, or defaults when no file is given.
///
/// The result is not validated: CLI overrides are applied first and the
/// caller runs [`Config::validate`] on the final value.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&content).with_context(|| "Failed to parse config file")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline() -> Config {
        let mut config = Config::default();
        config.ai.enabled = false;
        config
    }

    #[test]
    fn defaults_match_note_app_schema() {
        let config = Config::default();
        assert_eq!(config.db.path, PathBuf::from("blocdenotas.db"));
        assert_eq!(config.output.dir, PathBuf::from("migrated_notes_md"));
        assert_eq!(config.source.table, "notes");
        assert_eq!(config.source.id_column, "_id");
        assert_eq!(config.source.created_column, "date");
        assert_eq!(config.source.updated_column, "updated_at");
        assert_eq!(config.ai.content_limit, 2000);
        assert_eq!(config.ai.delay(), Duration::from_secs(4));
        assert_eq!(config.ai.language, Language::En);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [source]
            table = "memos"

            [ai]
            language = "es"
            delay_secs = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.source.table, "memos");
        assert_eq!(config.source.body_column, "body");
        assert_eq!(config.ai.language, Language::Es);
        assert_eq!(config.ai.delay(), Duration::from_millis(500));
        assert!(config.ai.enabled);
    }

    #[test]
    fn unknown_language_is_rejected() {
        let parsed: std::result::Result<Config, _> = toml::from_str("[ai]\nlanguage = \"fr\"\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn ai_requires_api_key() {
        let mut config = Config::default();
        config.ai.api_key = None;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("--no-ai"));

        config.ai.api_key = Some("secret".to_string());
        config.validate().unwrap();
    }

    #[test]
    fn disabled_ai_needs_no_key() {
        offline().validate().unwrap();
    }

    #[test]
    fn negative_delay_is_rejected() {
        let mut config = offline();
        config.ai.delay_secs = -1.0;
        assert!(config.validate().is_err());
        assert_eq!(config.ai.delay(), Duration::ZERO);
    }

    #[test]
    fn blank_column_is_rejected() {
        let mut config = offline();
        config.source.body_column = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("source.body_column"));
    }

    #[test]
    fn missing_file_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.source.title_column, "title");
    }
}
