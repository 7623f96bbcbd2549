//! Shared fixtures for handler and router tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use relay_client::{
    ChatId, ClientConfig, ClientError, LifecycleEvent, MediaFetcher, MessagePayload,
    MessagingClient, MessagingEngine, ReadinessGate, Result, SessionState,
};
use relay_store::{InMemoryStore, SessionSnapshot};
use tokio::sync::{mpsc, Mutex};

use crate::state::AppState;

/// Engine that records sends and optionally reports ready on start.
#[derive(Default)]
pub(crate) struct RecordingEngine {
    pub ready: bool,
    pub fail_send: bool,
    pub sent: Mutex<Vec<(ChatId, MessagePayload)>>,
    events: Mutex<Option<mpsc::Sender<LifecycleEvent>>>,
}

impl RecordingEngine {
    /// Ready engine whose sends always fail.
    pub fn failing() -> Self {
        Self {
            ready: true,
            fail_send: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl MessagingEngine for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }

    async fn start(
        &self,
        _restore: Option<SessionSnapshot>,
        events: mpsc::Sender<LifecycleEvent>,
    ) -> Result<()> {
        if self.ready {
            events.send(LifecycleEvent::Authenticated).await.ok();
            events.send(LifecycleEvent::Ready).await.ok();
        }
        *self.events.lock().await = Some(events);
        Ok(())
    }

    async fn send_message(&self, chat_id: &ChatId, payload: &MessagePayload) -> Result<()> {
        self.sent
            .lock()
            .await
            .push((chat_id.clone(), payload.clone()));
        if self.fail_send {
            return Err(ClientError::Engine("evaluation failed: chat not found".into()));
        }
        Ok(())
    }

    async fn snapshot(&self) -> Result<SessionSnapshot> {
        Ok(SessionSnapshot::new(b"session".to_vec()))
    }
}

pub(crate) async fn make_state_with(engine: RecordingEngine) -> (AppState, Arc<RecordingEngine>) {
    let ready = engine.ready;
    let engine = Arc::new(engine);
    let client = MessagingClient::initialize(
        engine.clone(),
        Arc::new(InMemoryStore::new()),
        ClientConfig::new().with_persist_session(false),
        ReadinessGate::new(),
    );

    if ready {
        let mut rx = client.subscribe();
        tokio::time::timeout(
            Duration::from_secs(2),
            rx.wait_for(|s| *s == SessionState::Ready),
        )
        .await
        .expect("client not ready in time")
        .unwrap();
    }

    let state = AppState::new(
        Arc::new(client),
        MediaFetcher::with_timeout(Duration::from_secs(5)),
    );
    (state, engine)
}

pub(crate) async fn make_test_state(ready: bool) -> (AppState, Arc<RecordingEngine>) {
    make_state_with(RecordingEngine {
        ready,
        ..Default::default()
    })
    .await
}
