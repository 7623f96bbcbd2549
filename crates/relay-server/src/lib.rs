//! WhatsApp relay server.
//!
//! Wires the MongoDB session store, the messaging client and the HTTP API
//! together. The `wa-relay` binary is a thin wrapper around [`run`].

pub mod app;
pub mod config;
pub mod error;

pub use app::{install_panic_hook, run, shutdown_signal};
pub use config::{log_filter, Args, ServerConfig};
pub use error::{ConfigError, Result, ServerError};
