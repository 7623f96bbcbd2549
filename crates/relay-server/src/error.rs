//! Error types for the relay server.

use thiserror::Error;

/// Invalid or missing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `MONGO_URI` was not provided.
    #[error("MONGO_URI is required (set it in the environment or pass --mongo-uri)")]
    MissingMongoUri,

    /// A value was present but unusable.
    #[error("invalid {name}: {reason}")]
    Invalid {
        /// Setting name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Fatal errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Session store could not be reached.
    #[error("session store error: {0}")]
    Store(#[from] relay_store::StoreError),

    /// Messaging client could not be set up.
    #[error("client error: {0}")]
    Client(#[from] relay_client::ClientError),

    /// Binding or serving HTTP failed.
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
