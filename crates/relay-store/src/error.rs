//! Error types for session store operations.

use thiserror::Error;

/// Errors that can occur while talking to a session store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The connection string could not be parsed.
    #[error("invalid database URI: {0}")]
    InvalidUri(String),

    /// The database could not be reached.
    #[error("connection error: {0}")]
    Connection(String),

    /// A query against the database failed.
    #[error("database error: {0}")]
    Database(String),

    /// A stored document had an unexpected shape.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
