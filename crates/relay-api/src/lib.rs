//! HTTP API for the WhatsApp relay.
//!
//! Routes:
//! - `GET /`: liveness text
//! - `POST /send-whatsapp`: send a text or media message to a phone number
//!
//! # Example
//!
//! ```ignore
//! use relay_api::{serve, ApiConfig, AppState};
//! use relay_client::MediaFetcher;
//! use std::sync::Arc;
//!
//! let state = AppState::new(Arc::new(client), MediaFetcher::new());
//! serve(ApiConfig::default(), state, async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
pub mod types;

#[cfg(test)]
mod test_support;

pub use config::{ApiConfig, DEFAULT_HOST, DEFAULT_PORT};
pub use error::{ApiError, Result};
pub use router::{create_router, serve};
pub use state::AppState;
