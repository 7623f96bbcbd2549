//! Session state machine.
//!
//! ```text
//! Unauthenticated --qr--> AwaitingScan --qr--> AwaitingScan
//!        |                     |
//!        +--authenticated------+--> Authenticated --ready--> Ready
//!        |                     |                              |
//!        +---------------------+---ready----------------------+
//!
//! any non-terminal --auth_failure|disconnected--> Disconnected (terminal)
//! ```
//!
//! `auth_failure` is only honoured before the session is ready. Nothing
//! leaves `Disconnected`: the relay does not reconnect on its own.

use std::fmt;

use crate::event::LifecycleEvent;

/// State of the messaging session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Login/restore in progress, nothing heard from the engine yet.
    #[default]
    Unauthenticated,
    /// A QR code was issued and is waiting to be scanned.
    AwaitingScan,
    /// Login succeeded; the session is still loading.
    Authenticated,
    /// The session can send messages.
    Ready,
    /// The session was lost or rejected.
    Disconnected,
}

impl SessionState {
    /// Returns the next state for `event`, or `None` if the event does not
    /// apply in this state.
    pub fn transition(self, event: &LifecycleEvent) -> Option<SessionState> {
        use LifecycleEvent as E;
        use SessionState as S;

        match (self, event) {
            (S::Disconnected, _) => None,
            (_, E::RemoteSessionSaved) => None,

            (S::Unauthenticated | S::AwaitingScan, E::Qr(_)) => Some(S::AwaitingScan),
            (S::Unauthenticated | S::AwaitingScan, E::Authenticated) => Some(S::Authenticated),
            (S::Unauthenticated | S::AwaitingScan | S::Authenticated, E::Ready) => Some(S::Ready),

            (S::Unauthenticated | S::AwaitingScan | S::Authenticated, E::AuthFailure(_)) => {
                Some(S::Disconnected)
            }
            (_, E::Disconnected(_)) => Some(S::Disconnected),

            (S::Authenticated | S::Ready, E::Qr(_))
            | (S::Authenticated | S::Ready, E::Authenticated)
            | (S::Ready, E::Ready)
            | (S::Ready, E::AuthFailure(_)) => None,
        }
    }

    /// Returns true if messages can be sent.
    pub fn is_ready(self) -> bool {
        self == SessionState::Ready
    }

    /// Returns true if no further transition is possible.
    pub fn is_terminal(self) -> bool {
        self == SessionState::Disconnected
    }

    /// Lowercase name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::AwaitingScan => "awaiting_scan",
            SessionState::Authenticated => "authenticated",
            SessionState::Ready => "ready",
            SessionState::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
