//! Readiness gate shared between the lifecycle loop and request handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Flag telling request handlers whether the session can send.
///
/// Clones share the same flag. The lifecycle loop is the only writer.
#[derive(Debug, Clone, Default)]
pub struct ReadinessGate {
    ready: Arc<AtomicBool>,
}

impl ReadinessGate {
    /// Creates a closed gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the session is ready.
    pub fn get(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Opens the gate.
    pub fn set_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Closes the gate.
    pub fn set_not_ready(&self) {
        self.ready.store(false, Ordering::Release);
    }
}
