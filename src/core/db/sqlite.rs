/// SQLite backend built on rusqlite.
///
/// Used when the configuration selects `backend = "sqlite"`; the database name
/// argument is then the path of the database file.

use crate::core::db::connection::Backend;
use crate::core::db::query::QueryResult;
use crate::core::db::value::SqlValue;
use crate::core::{Result, ShopError};
use rusqlite::{params_from_iter, types::ValueRef, Connection, OptionalExtension};
use tracing::debug;

/// A single rusqlite connection
#[derive(Debug)]
pub struct SqliteBackend {
    connection: Connection,
}

impl SqliteBackend {
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: &str) -> Result<Self> {
        let connection = Connection::open(path).map_err(ShopError::Database)?;
        Self::init(connection)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory().map_err(ShopError::Database)?;
        Self::init(connection)
    }

    fn init(connection: Connection) -> Result<Self> {
        connection
            .execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(ShopError::Database)?;
        Ok(SqliteBackend { connection })
    }

    /// Direct access to the connection, for seeding schemas.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

impl Backend for SqliteBackend {
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let mut stmt = self
            .connection
            .prepare(sql)
            .map_err(|e| ShopError::Query(format!("Failed to prepare statement: {}", e)))?;
        let affected = stmt
            .execute(params_from_iter(params.iter()))
            .map_err(|e| ShopError::Query(format!("Statement execution failed: {}", e)))?;
        Ok(affected as u64)
    }

    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<QueryResult> {
        let mut stmt = self
            .connection
            .prepare(sql)
            .map_err(|e| ShopError::Query(format!("Failed to prepare statement: {}", e)))?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let column_count = stmt.column_count();

        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                let mut values = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    values.push(format_value(row.get_ref(i)?));
                }
                Ok(values)
            })
            .map_err(|e| ShopError::Query(format!("Query execution failed: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ShopError::Query(format!("Result processing failed: {}", e)))?;

        Ok(QueryResult::new(columns, rows))
    }

    fn sequence_value(&mut self, name: &str) -> Result<Option<i64>> {
        // AUTOINCREMENT tables keep their counter in sqlite_sequence, keyed by table name.
        // The table itself only exists once such a table has been created.
        let has_sequences = self
            .connection
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence'",
                [],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !has_sequences {
            return Ok(None);
        }

        self.connection
            .query_row(
                "SELECT seq FROM sqlite_sequence WHERE name = $1",
                [name],
                |row| row.get::<_, i64>(0),
            )
            .optional()
            .map_err(|e| ShopError::Query(format!("Failed to read sequence '{}': {}", name, e)))
    }

    fn close(self: Box<Self>) -> Result<()> {
        debug!("closing sqlite connection");
        self.connection
            .close()
            .map_err(|(_, e)| ShopError::Database(e))
    }
}

/// Renders a SQLite value as text, NULL included.
fn format_value(value: ValueRef) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
        ValueRef::Blob(b) => format!("<BLOB: {} bytes>", b.len()),
    }
}
