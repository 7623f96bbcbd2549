//! Lifecycle events emitted by the messaging engine.

/// Events describing the progress of the messaging session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// No restorable session; the payload must be scanned from a phone.
    Qr(String),
    /// Login succeeded.
    Authenticated,
    /// The session can send messages.
    Ready,
    /// Login was rejected.
    AuthFailure(String),
    /// The active session was lost.
    Disconnected(String),
    /// Updated credentials were written to the session store.
    RemoteSessionSaved,
}

impl LifecycleEvent {
    /// Short name used in logs and on the bridge wire.
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Qr(_) => "qr",
            LifecycleEvent::Authenticated => "authenticated",
            LifecycleEvent::Ready => "ready",
            LifecycleEvent::AuthFailure(_) => "auth_failure",
            LifecycleEvent::Disconnected(_) => "disconnected",
            LifecycleEvent::RemoteSessionSaved => "remote_session_saved",
        }
    }

    /// Builds an event from its wire name and optional payload.
    ///
    /// Returns `None` for unknown names.
    pub fn from_wire(name: &str, data: Option<String>) -> Option<Self> {
        let event = match name {
            "qr" => LifecycleEvent::Qr(data.unwrap_or_default()),
            "authenticated" => LifecycleEvent::Authenticated,
            "ready" => LifecycleEvent::Ready,
            "auth_failure" => LifecycleEvent::AuthFailure(data.unwrap_or_default()),
            "disconnected" => LifecycleEvent::Disconnected(data.unwrap_or_default()),
            "remote_session_saved" => LifecycleEvent::RemoteSessionSaved,
            _ => return None,
        };
        Some(event)
    }
}
