//! Record source abstraction and the SQLite implementation.
//!
//! The pipeline only sees [`RecordSource`]; [`SqliteSource`] is the adapter
//! that knows about connections, identifier quoting, and the loosely typed
//! columns of note-app databases. Rows are converted into typed
//! [`NoteRecord`]s immediately after the query.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};
use std::path::PathBuf;
use tracing::debug;

use crate::config::SourceConfig;
use crate::db;
use crate::error::SourceError;
use crate::models::NoteRecord;

/// A persistent store of note records.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use note_migrate::config::SourceConfig;
/// use note_migrate::error::SourceError;
/// use note_migrate::models::NoteRecord;
/// use note_migrate::source::RecordSource;
///
/// pub struct FixedSource(Vec<NoteRecord>);
///
/// #[async_trait]
/// impl RecordSource for FixedSource {
///     async fn fetch_all(&self, _columns: &SourceConfig) -> Result<Vec<NoteRecord>, SourceError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Return every note in ascending id order.
    ///
    /// Errors are fatal to the run; no partial result is returned.
    async fn fetch_all(&self, columns: &SourceConfig) -> Result<Vec<NoteRecord>, SourceError>;
}

/// Reads notes from an SQLite database file.
pub struct SqliteSource {
    path: PathBuf,
}

impl SqliteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecordSource for SqliteSource {
    async fn fetch_all(&self, columns: &SourceConfig) -> Result<Vec<NoteRecord>, SourceError> {
        if !self.path.is_file() {
            return Err(SourceError::NotFound(self.path.clone()));
        }

        debug!(path = %self.path.display(), "connecting to database");
        let pool = db::connect_read_only(&self.path)
            .await
            .map_err(|source| SourceError::Connect {
                path: self.path.clone(),
                source,
            })?;

        let query = select_notes_sql(columns);
        debug!(table = %columns.table, "querying notes");
        let rows = sqlx::query(&query).fetch_all(&pool).await;

        pool.close().await;
        debug!("database connection closed");

        let rows = rows.map_err(|source| query_error(columns, source))?;
        rows.iter()
            .map(row_to_note)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| query_error(columns, source))
    }
}

fn query_error(columns: &SourceConfig, source: sqlx::Error) -> SourceError {
    SourceError::Query {
        table: columns.table.clone(),
        source,
    }
}

/// Quote an identifier with backticks.
///
/// SQLite treats an unknown double-quoted identifier as a string literal,
/// which would silently turn a misspelled column into constant values.
/// Backtick-quoted names must resolve or the statement fails.
fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn select_notes_sql(columns: &SourceConfig) -> String {
    let id = quote_ident(&columns.id_column);
    format!(
        "SELECT {id}, {title}, {body}, {created}, {updated} FROM {table} ORDER BY {id}",
        id = id,
        title = quote_ident(&columns.title_column),
        body = quote_ident(&columns.body_column),
        created = quote_ident(&columns.created_column),
        updated = quote_ident(&columns.updated_column),
        table = quote_ident(&columns.table),
    )
}

/// A column value decoded by its runtime storage class.
#[derive(Debug, Clone, PartialEq)]
enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    fn into_text(self) -> Option<String> {
        match self {
            SqlValue::Null => None,
            SqlValue::Integer(i) => Some(i.to_string()),
            // `1.0` stays `1.0` rather than collapsing to the integer form.
            SqlValue::Real(f) => Some(format!("{:?}", f)),
            SqlValue::Text(s) => Some(s),
            SqlValue::Blob(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }

    /// Creation dates are shown verbatim; empty and zero mean "unknown".
    fn into_created(self) -> Option<String> {
        match self {
            SqlValue::Integer(0) => None,
            SqlValue::Real(f) if f == 0.0 => None,
            other => other.into_text().filter(|s| !s.trim().is_empty()),
        }
    }

    fn into_epoch(self) -> Option<i64> {
        match self {
            SqlValue::Integer(i) => Some(i),
            SqlValue::Real(f) => real_to_epoch(f),
            SqlValue::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(real_to_epoch))
            }
            SqlValue::Null | SqlValue::Blob(_) => None,
        }
    }
}

fn real_to_epoch(f: f64) -> Option<i64> {
    if f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f.trunc() as i64)
    } else {
        None
    }
}

fn read_value(row: &SqliteRow, index: usize) -> Result<SqlValue, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let storage = raw.type_info().name().to_string();

    match storage.as_str() {
        "INTEGER" => row.try_get::<i64, _>(index).map(SqlValue::Integer),
        "REAL" => row.try_get::<f64, _>(index).map(SqlValue::Real),
        "TEXT" => row.try_get::<String, _>(index).map(SqlValue::Text),
        _ => row.try_get::<Vec<u8>, _>(index).map(SqlValue::Blob),
    }
}

fn row_to_note(row: &SqliteRow) -> Result<NoteRecord, sqlx::Error> {
    Ok(NoteRecord {
        id: read_value(row, 0)?.into_text().unwrap_or_default(),
        title: read_value(row, 1)?.into_text().unwrap_or_default(),
        body: read_value(row, 2)?.into_text().unwrap_or_default(),
        created: read_value(row, 3)?.into_created(),
        updated: read_value(row, 4)?.into_epoch(),
    })
}
