/// Database Module
///
/// This module provides the database access utility used by every menu action,
/// organized into focused submodules.
///
/// ## Architecture
///
/// - **Connection Management** (`connection.rs`): connection settings, the
///   `Backend` seam and the owned `Database` handle
/// - **Query Execution** (`query.rs`): update/query/print operations on `Database`
/// - **Values** (`value.rs`): typed statement parameters
/// - **Backends** (`pg.rs`, `sqlite.rs`): driver-specific implementations
///
/// ## Parameters
///
/// Statements use `$1, $2, ...` placeholders. PostgreSQL binds them natively and
/// SQLite treats each `$N` as a named parameter numbered in order of appearance,
/// so the same SQL text runs on both backends.
pub mod connection;
pub mod pg;
pub mod query;
pub mod sqlite;
pub mod value;

pub use connection::*;
pub use query::*;
pub use value::SqlValue;
