//! SessionStore trait definition and the read-only wrapper.
//!
//! A session store keeps at most one snapshot per session name. The
//! messaging client checks for an existing snapshot at startup, extracts it
//! for restore, and saves a fresh one periodically while the session is
//! ready.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::snapshot::SessionSnapshot;

/// Trait for remote session storage backends.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns true if a snapshot is stored under `session`.
    async fn session_exists(&self, session: &str) -> Result<bool>;

    /// Stores a snapshot, replacing any previous one for the same session.
    async fn save(&self, session: &str, snapshot: SessionSnapshot) -> Result<()>;

    /// Loads the snapshot stored under `session`, if any.
    async fn extract(&self, session: &str) -> Result<Option<SessionSnapshot>>;

    /// Removes the snapshot stored under `session`.
    ///
    /// Deleting a missing session is not an error.
    async fn delete(&self, session: &str) -> Result<()>;

    /// Returns true if this store never persists updates.
    fn is_read_only(&self) -> bool {
        false
    }
}

#[async_trait]
impl<S: SessionStore + ?Sized> SessionStore for Arc<S> {
    async fn session_exists(&self, session: &str) -> Result<bool> {
        (**self).session_exists(session).await
    }

    async fn save(&self, session: &str, snapshot: SessionSnapshot) -> Result<()> {
        (**self).save(session, snapshot).await
    }

    async fn extract(&self, session: &str) -> Result<Option<SessionSnapshot>> {
        (**self).extract(session).await
    }

    async fn delete(&self, session: &str) -> Result<()> {
        (**self).delete(session).await
    }

    fn is_read_only(&self) -> bool {
        (**self).is_read_only()
    }
}

/// Wrapper that restores sessions but never writes them back.
///
/// Reads go to the inner store; `save` and `delete` are silently dropped.
/// Used for deployments that share credentials they must not modify.
///
/// # Example
///
/// ```
/// use relay_store::{InMemoryStore, ReadOnlyStore, SessionSnapshot, SessionStore};
///
/// # async fn example() -> relay_store::Result<()> {
/// let store = ReadOnlyStore::new(InMemoryStore::new());
/// store.save("RemoteAuth", SessionSnapshot::new(vec![1])).await?;
/// assert!(!store.session_exists("RemoteAuth").await?);
/// # Ok(())
/// # }
/// ```
pub struct ReadOnlyStore<S: SessionStore> {
    inner: S,
}

impl<S: SessionStore> ReadOnlyStore<S> {
    /// Wraps a store.
    pub fn new(inner: S) -> Self {
        debug!("Session store wrapped read-only");
        Self { inner }
    }
}

#[async_trait]
impl<S: SessionStore> SessionStore for ReadOnlyStore<S> {
    async fn session_exists(&self, session: &str) -> Result<bool> {
        self.inner.session_exists(session).await
    }

    async fn save(&self, session: &str, snapshot: SessionSnapshot) -> Result<()> {
        debug!(
            session = %session,
            bytes = snapshot.len(),
            "Read-only store: discarding session save"
        );
        Ok(())
    }

    async fn extract(&self, session: &str) -> Result<Option<SessionSnapshot>> {
        self.inner.extract(session).await
    }

    async fn delete(&self, session: &str) -> Result<()> {
        debug!(session = %session, "Read-only store: discarding session delete");
        Ok(())
    }

    fn is_read_only(&self) -> bool {
        true
    }
}
