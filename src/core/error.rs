/// Mechanic Shop Error Module
///
/// This module defines the error type shared by the database layer, the
/// configuration loader and the menu controller.
use std::error::Error as _;
use thiserror::Error;

/// Error type for the mechanic shop console.
///
/// Every failure inside a menu action ends up as one of these variants and is
/// printed to the operator; only connection failures at startup are fatal.
#[derive(Error, Debug)]
pub enum ShopError {
    /// Errors raised by the SQLite driver
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Errors raised by the PostgreSQL driver
    #[error("Database error: {}", postgres_message(.0))]
    Postgres(#[from] postgres::Error),

    /// Statement preparation, execution or parameter binding failures
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed operator input for a record field
    #[error("Input error: {0}")]
    Input(String),

    /// Bad command-line invocation
    #[error("{0}")]
    Usage(String),

    /// Console and file system I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Menu actions without a defined query
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

/// Type alias for Result to use ShopError as the error type.
pub type Result<T> = std::result::Result<T, ShopError>;

/// The server's message for `e`, or the driver's error chain when the failure
/// never reached the server.
fn postgres_message(e: &postgres::Error) -> String {
    if let Some(db) = e.as_db_error() {
        return match db.detail() {
            Some(detail) => format!("{} ({})", db.message(), detail),
            None => db.message().to_string(),
        };
    }
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        // Some driver versions already append the cause to their own text
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
