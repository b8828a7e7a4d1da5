/// Core Module for the mechanic shop console
///
/// Shared infrastructure: the database access layer and the error type every
/// other module reports through.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{Result, ShopError};
