//! MessagingEngine trait: the seam to the automation engine that owns the
//! actual WhatsApp Web session.

use async_trait::async_trait;
use relay_store::SessionSnapshot;
use tokio::sync::mpsc;

use crate::chat::{ChatId, MessagePayload};
use crate::error::Result;
use crate::event::LifecycleEvent;

/// An engine capable of logging into WhatsApp Web and sending messages.
///
/// The relay never speaks the chat protocol itself. Implementations wrap
/// whatever drives the browser session and report progress through
/// [`LifecycleEvent`]s.
#[async_trait]
pub trait MessagingEngine: Send + Sync {
    /// Engine name for logs.
    fn name(&self) -> &str;

    /// Starts the login/restore sequence and returns without waiting for it.
    ///
    /// `restore` carries a previously saved session, if any. Lifecycle
    /// events are delivered on `events` until the engine stops or the
    /// receiver is dropped.
    async fn start(
        &self,
        restore: Option<SessionSnapshot>,
        events: mpsc::Sender<LifecycleEvent>,
    ) -> Result<()>;

    /// Sends a payload to a chat.
    async fn send_message(&self, chat_id: &ChatId, payload: &MessagePayload) -> Result<()>;

    /// Captures the current session credentials for backup.
    async fn snapshot(&self) -> Result<SessionSnapshot>;

    /// Stops delivering events and releases engine resources.
    async fn stop(&self) -> Result<()> {
        Ok(())
    }
}
