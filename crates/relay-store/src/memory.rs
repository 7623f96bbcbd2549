//! In-memory session store for development and testing.
//!
//! Nothing survives a restart, so a relay running on this store has to be
//! paired again every time it starts.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::snapshot::SessionSnapshot;
use crate::store::SessionStore;

/// Process-local session store.
#[derive(Default)]
pub struct InMemoryStore {
    sessions: RwLock<HashMap<String, SessionSnapshot>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns true if no session is stored.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn session_exists(&self, session: &str) -> Result<bool> {
        Ok(self.sessions.read().await.contains_key(session))
    }

    async fn save(&self, session: &str, snapshot: SessionSnapshot) -> Result<()> {
        debug!(session = %session, bytes = snapshot.len(), "Saving session in memory");
        self.sessions
            .write()
            .await
            .insert(session.to_string(), snapshot);
        Ok(())
    }

    async fn extract(&self, session: &str) -> Result<Option<SessionSnapshot>> {
        Ok(self.sessions.read().await.get(session).cloned())
    }

    async fn delete(&self, session: &str) -> Result<()> {
        self.sessions.write().await.remove(session);
        Ok(())
    }
}
