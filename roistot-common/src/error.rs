//! Errors of the storage and configuration layers

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a store, version or configuration operation
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite rejected a statement or the pool could not connect
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database directory or config file could not be accessed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// List column (ranks, names, roles...) could not be encoded as JSON text
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Setting with an unusable value, such as a bulk size of 0
    #[error("Configuration error: {0}")]
    Config(String),

    /// No version with the given id, or no active version
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bulk insert call the store refuses before touching the database
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Stored data that breaks a schema invariant
    #[error("Internal error: {0}")]
    Internal(String),
}
