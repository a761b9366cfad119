//! Read-only access to the subscriber snapshot.

use copilot_core::{AppError, AppResult};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tabular result of a read-only query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl QueryTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Plain-text table: a header line then one line per row.
    ///
    /// Each column is right-aligned to its widest cell; columns are separated
    /// by two spaces.
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let format_line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:>width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join("  ")
        };

        std::iter::once(format_line(self.columns.as_slice()))
            .chain(self.rows.iter().map(|row| format_line(row.as_slice())))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Anything that can run a read-only query against the subscriber data.
pub trait SubscriberStore: Send + Sync {
    fn query(&self, sql: &str) -> AppResult<QueryTable>;
}

/// SQLite snapshot opened read-only on every query.
///
/// No connection is held between calls, so the store can be shared across
/// threads without locking.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> AppResult<Connection> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| AppError::Sql(format!("Failed to open {:?}: {}", self.path, e)))
    }
}

impl SubscriberStore for SqliteStore {
    fn query(&self, sql: &str) -> AppResult<QueryTable> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(sql).map_err(sql_error)?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let column_count = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([]).map_err(sql_error)?;
        while let Some(row) = cursor.next().map_err(sql_error)? {
            let mut cells = Vec::with_capacity(column_count);
            for i in 0..column_count {
                cells.push(render_value(row.get_ref(i).map_err(sql_error)?));
            }
            rows.push(cells);
        }

        tracing::debug!("Query returned {} rows", rows.len());
        Ok(QueryTable { columns, rows })
    }
}

fn sql_error(e: rusqlite::Error) -> AppError {
    AppError::Sql(e.to_string())
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
    }
}
