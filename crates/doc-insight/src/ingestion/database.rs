//! SQLite extractor: fetch-all from a configured table

use async_trait::async_trait;
use rusqlite::{types::ValueRef, Connection, OpenFlags};
use std::path::{Path, PathBuf};

use super::{run_blocking, Extractor};
use crate::error::{Error, Result};
use crate::types::{Cell, Payload, SourceKind, Table};

/// Reads every row of one table from a SQLite database file
#[derive(Debug, Clone)]
pub struct DatabaseExtractor {
    table: String,
}

impl DatabaseExtractor {
    /// Create an extractor for `table`; the name must be a plain identifier
    pub fn new(table: &str) -> Result<Self> {
        let valid = !table.is_empty()
            && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !table.starts_with(|c: char| c.is_ascii_digit());
        if !valid {
            return Err(Error::Config(format!("Invalid database table name: '{}'", table)));
        }
        Ok(Self {
            table: table.to_string(),
        })
    }

    /// Table this extractor queries
    pub fn table(&self) -> &str {
        &self.table
    }
}

#[async_trait]
impl Extractor for DatabaseExtractor {
    fn kind(&self) -> SourceKind {
        SourceKind::Database
    }

    async fn extract(&self, location: &str) -> Result<Payload> {
        let path = PathBuf::from(location);
        let table = self.table.clone();
        let origin = format!("database '{}'", path.display());
        run_blocking(origin.clone(), move || read_table(&path, &table, &origin)).await
    }
}

fn read_table(path: &Path, table: &str, origin: &str) -> Result<Payload> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| Error::extraction(origin, format!("Failed to open database: {}", e)))?;

    let sql = format!("SELECT * FROM \"{}\"", table);
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::extraction(origin, format!("Failed to query '{}': {}", table, e)))?;

    // Schema comes from the result set, not from a fixed layout
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();

    let mut rows = stmt
        .query([])
        .map_err(|e| Error::extraction(origin, format!("Failed to query '{}': {}", table, e)))?;

    let mut data = Vec::new();
    while let Some(row) = rows
        .next()
        .map_err(|e| Error::extraction(origin, format!("Failed to read row: {}", e)))?
    {
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            let value = row
                .get_ref(i)
                .map_err(|e| Error::extraction(origin, format!("Failed to read column {}: {}", i, e)))?;
            cells.push(value_to_cell(value));
        }
        data.push(cells);
    }

    tracing::info!(
        "Read {} rows x {} columns from table '{}' in {}",
        data.len(),
        width,
        table,
        path.display()
    );

    Ok(Payload::Tables(vec![Table::new(table, columns, data)]))
}

fn value_to_cell(value: ValueRef<'_>) -> Cell {
    match value {
        ValueRef::Null => Cell::Empty,
        ValueRef::Integer(i) => Cell::Int(i),
        ValueRef::Real(f) => Cell::Float(f),
        ValueRef::Text(t) => Cell::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Cell::Text(format!("<{} bytes>", b.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_db(dir: &Path) -> PathBuf {
        let path = dir.join("calls.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE calls (caller TEXT, callee TEXT, duration REAL, call_time TEXT);
            INSERT INTO calls VALUES ('alice', 'bob', 61.5, '2024-03-01 09:15:00');
            INSERT INTO calls VALUES ('carol', NULL, 12, '2024-03-01 22:40:00');
            "#,
        )
        .unwrap();
        path
    }

    #[tokio::test]
    async fn test_reads_schema_from_result_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_db(dir.path());

        let extractor = DatabaseExtractor::new("calls").unwrap();
        let payload = extractor.extract(path.to_str().unwrap()).await.unwrap();

        let table = payload.table("calls").unwrap();
        assert_eq!(table.columns, vec!["caller", "callee", "duration", "call_time"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0][2], Cell::Float(61.5));
        assert_eq!(table.rows[1][1], Cell::Empty);
    }

    #[tokio::test]
    async fn test_missing_table_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_db(dir.path());

        let extractor = DatabaseExtractor::new("invoices").unwrap();
        let err = extractor.extract(path.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }

    #[test]
    fn test_rejects_non_identifier_table() {
        assert!(DatabaseExtractor::new("calls; DROP TABLE calls").is_err());
        assert!(DatabaseExtractor::new("").is_err());
        assert!(DatabaseExtractor::new("1calls").is_err());
        assert!(DatabaseExtractor::new("call_log_2024").is_ok());
    }
}
