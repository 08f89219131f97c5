use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_note-migrate"))
}

async fn setup_test_env() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("notes.db");

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    sqlx::query(
        "CREATE TABLE notes (_id INTEGER PRIMARY KEY, title TEXT, body TEXT, date TEXT, updated_at INTEGER)",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO notes VALUES \
         (1, 'Shopping', 'milk, eggs', '2021-05-12', 1700000000), \
         (2, '', '', NULL, NULL), \
         (3, 'Old', 'an older note', NULL, NULL)",
    )
    .execute(&pool)
    .await
    .unwrap();
    pool.close().await;

    tmp
}

fn run(root: &Path, args: &[&str]) -> (String, String, bool) {
    let bin = binary();
    let output = Command::new(&bin)
        .current_dir(root)
        .env_remove("GEMINI_API_KEY")
        .env_remove("RUST_LOG")
        .env_remove("NOTE_MIGRATE_LOG")
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run note-migrate at {:?}: {}", bin, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[tokio::test]
async fn test_migrate_without_ai() {
    let tmp = setup_test_env().await;

    let (stdout, stderr, success) = run(
        tmp.path(),
        &["--db", "notes.db", "--output", "out", "--no-ai"],
    );
    assert!(success, "migrate failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Total notes found: 3"));
    assert!(stdout.contains("Notes processed: 2"));
    assert!(stdout.contains("Notes skipped (empty): 1"));
    assert!(stdout.contains("File errors: 0"));

    let out = tmp.path().join("out");
    assert!(out.join("1_Shopping.md").is_file());
    assert!(out.join("3_Old.md").is_file());
    assert!(stdout.contains(&fs::canonicalize(&out).unwrap().display().to_string()));
}

#[tokio::test]
async fn test_json_summary() {
    let tmp = setup_test_env().await;

    let (stdout, stderr, success) = run(
        tmp.path(),
        &["--db", "notes.db", "--output", "out", "--no-ai", "--json"],
    );
    assert!(success, "migrate failed: stderr={}", stderr);

    let summary: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(summary["total_found"], 3);
    assert_eq!(summary["processed"], 2);
    assert_eq!(summary["skipped_empty"], 1);
    assert_eq!(summary["suggestion_fallbacks"], 0);
    assert_eq!(summary["write_errors"], 0);
    assert!(summary["error"].is_null());
}

#[tokio::test]
async fn test_missing_database_still_prints_summary() {
    let tmp = setup_test_env().await;

    let (stdout, stderr, success) = run(
        tmp.path(),
        &["--db", "absent.db", "--output", "out", "--no-ai"],
    );
    assert!(!success);
    assert!(stdout.contains("Total notes found: 0"));
    assert!(stderr.contains("database file not found"));
}

#[tokio::test]
async fn test_ai_requires_api_key() {
    let tmp = setup_test_env().await;

    let (stdout, stderr, success) = run(tmp.path(), &["--db", "notes.db", "--output", "out"]);
    assert!(!success);
    assert!(stderr.contains("No API key provided"));
    assert!(stdout.contains("--- Summary ---"));
    assert!(stdout.contains("Total notes found: 0"));
    assert!(stdout.contains("Notes processed: 0"));
    assert!(!tmp.path().join("out").exists(), "nothing is written before validation");
}

#[tokio::test]
async fn test_config_error_json_summary_carries_error() {
    let tmp = setup_test_env().await;

    let (stdout, _, success) = run(
        tmp.path(),
        &["--db", "notes.db", "--output", "out", "--json"],
    );
    assert!(!success);

    let summary: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(summary["total_found"], 0);
    assert_eq!(summary["processed"], 0);
    assert!(summary["error"]
        .as_str()
        .unwrap()
        .contains("No API key provided"));
    assert!(!tmp.path().join("out").exists());
}

#[tokio::test]
async fn test_config_file_with_overrides() {
    let tmp = setup_test_env().await;

    let config = r#"
[db]
path = "notes.db"

[output]
dir = "from_config"

[ai]
enabled = false
"#;
    fs::write(tmp.path().join("migrate.toml"), config).unwrap();

    let (stdout, stderr, success) = run(
        tmp.path(),
        &["--config", "migrate.toml", "--output", "from_flag"],
    );
    assert!(success, "migrate failed: stdout={}, stderr={}", stdout, stderr);
    assert!(tmp.path().join("from_flag/1_Shopping.md").is_file());
    assert!(!tmp.path().join("from_config").exists());
}

#[tokio::test]
async fn test_bad_column_fails() {
    let tmp = setup_test_env().await;

    let (_, stderr, success) = run(
        tmp.path(),
        &["--db", "notes.db", "--no-ai", "--body-column", "content"],
    );
    assert!(!success);
    assert!(stderr.contains("check the table and column names"));
}
