/// Connection Management Module
///
/// This module provides connection settings, the backend seam that the query
/// layer talks to, and the owned `Database` handle whose lifetime bounds the
/// single open connection.

use crate::core::db::pg::PgBackend;
use crate::core::db::query::QueryResult;
use crate::core::db::sqlite::SqliteBackend;
use crate::core::db::value::SqlValue;
use crate::core::{Result, ShopError};
use serde::Deserialize;
use std::fmt;
use tracing::{debug, info};

/// Database driver used for the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// PostgreSQL server reached over TCP
    #[default]
    Postgres,
    /// SQLite file; the database name is its path
    Sqlite,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Postgres => write!(f, "postgres"),
            BackendKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Everything needed to open the session's connection
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionSettings {
    pub backend: BackendKind,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl ConnectionSettings {
    /// Builds settings from the three positional arguments `<dbname> <port> <user>`.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Usage` if the argument count is not three or the port
    /// is not a number.
    pub fn from_args(
        args: &[String],
        backend: BackendKind,
        host: &str,
        password: &str,
    ) -> Result<Self> {
        let [database, port, user] = args else {
            return Err(ShopError::Usage(format!(
                "expected 3 arguments, got {}",
                args.len()
            )));
        };
        let port = port
            .parse::<u16>()
            .map_err(|_| ShopError::Usage(format!("invalid port '{}'", port)))?;

        Ok(ConnectionSettings {
            backend,
            host: host.to_string(),
            port,
            database: database.clone(),
            user: user.clone(),
            password: password.to_string(),
        })
    }

    /// Connection URL shown to the operator. Never includes the password.
    pub fn url(&self) -> String {
        match self.backend {
            BackendKind::Postgres => {
                format!("postgresql://{}:{}/{}", self.host, self.port, self.database)
            }
            BackendKind::Sqlite => format!("sqlite://{}", self.database),
        }
    }
}

/// Driver-specific statement execution.
///
/// Implementations hold exactly one connection and are only ever used from
/// the thread that created them.
pub trait Backend {
    /// Runs a mutating statement and returns the affected row count.
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64>;

    /// Runs a query and returns every row rendered as text.
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<QueryResult>;

    /// Current value of the named sequence, `None` if it has none.
    fn sequence_value(&mut self, name: &str) -> Result<Option<i64>>;

    /// Closes the underlying connection.
    fn close(self: Box<Self>) -> Result<()>;
}

/// The session's database handle.
///
/// Owns the one connection for the lifetime of the program; the menu borrows
/// it mutably and `main` releases it with [`Database::cleanup`].
pub struct Database {
    pub(crate) backend: Box<dyn Backend>,
}

impl Database {
    /// Opens the connection described by `settings`.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the server is unreachable, the credentials
    /// are rejected, or the SQLite file cannot be opened.
    pub fn connect(settings: &ConnectionSettings) -> Result<Self> {
        info!(backend = %settings.backend, url = %settings.url(), "connecting");
        let backend: Box<dyn Backend> = match settings.backend {
            BackendKind::Postgres => Box::new(PgBackend::connect(settings)?),
            BackendKind::Sqlite => Box::new(SqliteBackend::open(&settings.database)?),
        };
        Ok(Database { backend })
    }

    /// Wraps an already-open backend.
    pub fn from_backend(backend: Box<dyn Backend>) -> Self {
        Database { backend }
    }

    /// Closes the connection. Close errors are discarded.
    pub fn cleanup(self) {
        match self.backend.close() {
            Ok(()) => info!("disconnected"),
            Err(e) => debug!("ignoring error while closing connection: {}", e),
        }
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
