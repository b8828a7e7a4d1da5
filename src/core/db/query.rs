/// Query Execution Module
///
/// The four statement operations every menu action goes through, plus the
/// sequence lookup. Each is one round trip on the session's connection.

use crate::core::db::connection::Database;
use crate::core::db::value::SqlValue;
use crate::core::Result;
use std::io::{self, Write};
use tracing::debug;

/// Represents the result of a SQL query execution
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Column names from the query result
    pub columns: Vec<String>,
    /// Rows of data as string values
    pub rows: Vec<Vec<String>>,
    /// Number of rows returned
    pub row_count: usize,
}

impl QueryResult {
    /// Creates a new QueryResult from column names and row data
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let row_count = rows.len();
        QueryResult {
            columns,
            rows,
            row_count,
        }
    }

    /// Writes the header line followed by one line per row, every field
    /// terminated by a tab. Writes nothing when there are no rows.
    pub fn write_table<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.rows.is_empty() {
            return Ok(());
        }
        for column in &self.columns {
            write!(out, "{}\t", column)?;
        }
        writeln!(out)?;
        for row in &self.rows {
            for value in row {
                write!(out, "{}\t", value)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

impl Database {
    /// Runs a mutating statement (INSERT, UPDATE, DELETE, DDL).
    ///
    /// # Returns
    ///
    /// The number of rows the statement affected.
    pub fn execute_update(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        debug!(sql, ?params, "execute update");
        self.backend.execute(sql, params)
    }

    /// Runs a query and prints its rows as a tab-separated table to `out`.
    ///
    /// # Returns
    ///
    /// The number of rows printed. An empty result prints nothing, not even
    /// the header.
    pub fn execute_query_and_print<W: Write>(
        &mut self,
        sql: &str,
        params: &[SqlValue],
        out: &mut W,
    ) -> Result<usize> {
        debug!(sql, ?params, "execute query and print");
        let result = self.backend.query(sql, params)?;
        result.write_table(out)?;
        out.flush()?;
        Ok(result.row_count)
    }

    /// Runs a query and returns its rows, each an ordered list of text values.
    pub fn execute_query_and_return(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<Vec<Vec<String>>> {
        debug!(sql, ?params, "execute query and return");
        Ok(self.backend.query(sql, params)?.rows)
    }

    /// Runs a query and reports whether it yields at least one row.
    pub fn execute_query_exists(&mut self, sql: &str, params: &[SqlValue]) -> Result<bool> {
        debug!(sql, ?params, "execute query exists");
        Ok(self.backend.query(sql, params)?.row_count > 0)
    }

    /// Current value of a named sequence, `None` when it has no value.
    pub fn current_sequence_value(&mut self, name: &str) -> Result<Option<i64>> {
        debug!(name, "current sequence value");
        self.backend.sequence_value(name)
    }
}
