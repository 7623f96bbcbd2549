//! WhatsApp messaging client for the relay.
//!
//! Wraps a [`MessagingEngine`] (the component that actually drives a
//! WhatsApp Web session) with:
//! - Session restore from and periodic backup to a [`relay_store::SessionStore`]
//! - A lifecycle state machine fed by engine events
//! - A [`ReadinessGate`] that is open only while the session is ready
//! - Media download for outbound attachments
//!
//! # Example
//!
//! ```ignore
//! use relay_client::{BridgeConfig, BridgeEngine, ClientConfig, MessagingClient, ReadinessGate};
//! use relay_store::InMemoryStore;
//! use std::sync::Arc;
//!
//! let engine = Arc::new(BridgeEngine::new(BridgeConfig::default())?);
//! let gate = ReadinessGate::new();
//! let client = MessagingClient::initialize(
//!     engine,
//!     Arc::new(InMemoryStore::new()),
//!     ClientConfig::default(),
//!     gate.clone(),
//! );
//! ```

pub mod bridge;
pub mod chat;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod gate;
pub mod media;
pub mod qr;
pub mod state;

pub use bridge::{BridgeConfig, BridgeEngine, DEFAULT_BRIDGE_URL};
pub use chat::{ChatId, MessagePayload};
pub use client::{MessagingClient, LOGOUT_REASON};
pub use config::{ClientConfig, DEFAULT_SESSION_NAME, MIN_BACKUP_INTERVAL};
pub use engine::MessagingEngine;
pub use error::{ClientError, Result};
pub use event::LifecycleEvent;
pub use gate::ReadinessGate;
pub use media::{MediaAttachment, MediaFetcher, FALLBACK_MIMETYPE};
pub use qr::render_qr;
pub use state::SessionState;
