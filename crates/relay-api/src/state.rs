//! Application state shared across handlers.

use std::sync::Arc;

use relay_client::{MediaFetcher, MessagingClient, ReadinessGate};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Messaging client used for delivery.
    pub client: Arc<MessagingClient>,
    /// Readiness gate, read-only from the HTTP side.
    pub gate: ReadinessGate,
    /// Downloader for media URLs.
    pub media: MediaFetcher,
}

impl AppState {
    /// Creates a new AppState around a running client.
    pub fn new(client: Arc<MessagingClient>, media: MediaFetcher) -> Self {
        let gate = client.gate().clone();
        Self {
            client,
            gate,
            media,
        }
    }

    /// Returns true if messages can be sent.
    pub fn is_ready(&self) -> bool {
        self.gate.get()
    }
}
