//! Messaging client: lifecycle loop, session backup and sending.

use std::sync::Arc;

use relay_store::{SessionSnapshot, SessionStore};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, Duration};
use tracing::{debug, error, info, warn};

use crate::chat::{ChatId, MessagePayload};
use crate::config::ClientConfig;
use crate::engine::MessagingEngine;
use crate::error::{ClientError, Result};
use crate::event::LifecycleEvent;
use crate::gate::ReadinessGate;
use crate::qr::render_qr;
use crate::state::SessionState;

/// Disconnect reason reported when the phone unlinks the session.
pub const LOGOUT_REASON: &str = "LOGOUT";

/// Handle to a running messaging session.
///
/// Created with [`MessagingClient::initialize`], which starts the login or
/// restore sequence in the background and returns immediately.
pub struct MessagingClient {
    engine: Arc<dyn MessagingEngine>,
    config: ClientConfig,
    gate: ReadinessGate,
    state_rx: watch::Receiver<SessionState>,
    shutdown_tx: watch::Sender<bool>,
    lifecycle: Mutex<Option<JoinHandle<()>>>,
}

impl MessagingClient {
    /// Starts the session lifecycle against `store`.
    ///
    /// Must be called from within a tokio runtime. The gate is opened and
    /// closed by the lifecycle loop only.
    pub fn initialize(
        engine: Arc<dyn MessagingEngine>,
        store: Arc<dyn SessionStore>,
        config: ClientConfig,
        gate: ReadinessGate,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(SessionState::Unauthenticated);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(
            engine = engine.name(),
            session = %config.session_name,
            persist = config.persist_session && !store.is_read_only(),
            "Initializing WhatsApp client"
        );

        let lifecycle = Lifecycle {
            engine: Arc::clone(&engine),
            store,
            config: config.clone(),
            gate: gate.clone(),
            state: state_tx,
            shutdown: shutdown_rx,
            backup: None,
        };
        let handle = tokio::spawn(lifecycle.run());

        Self {
            engine,
            config,
            gate,
            state_rx,
            shutdown_tx,
            lifecycle: Mutex::new(Some(handle)),
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Returns true if the session can send.
    pub fn is_ready(&self) -> bool {
        self.gate.get()
    }

    /// The readiness gate driven by this client.
    pub fn gate(&self) -> &ReadinessGate {
        &self.gate
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Sends a payload, bounded by the configured send timeout.
    ///
    /// Failures are returned as-is; nothing is retried.
    pub async fn send_message(&self, chat_id: &ChatId, payload: &MessagePayload) -> Result<()> {
        debug!(chat_id = %chat_id, kind = payload.kind(), "Sending message");

        match timeout(
            self.config.send_timeout,
            self.engine.send_message(chat_id, payload),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout {
                operation: "send",
                seconds: self.config.send_timeout.as_secs(),
            }),
        }
    }

    /// Stops the lifecycle and backup tasks and the engine.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);

        let handle = self.lifecycle.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Lifecycle task ended abnormally");
            }
        }
        info!("WhatsApp client stopped");
    }
}

impl Drop for MessagingClient {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Background task consuming lifecycle events.
struct Lifecycle {
    engine: Arc<dyn MessagingEngine>,
    store: Arc<dyn SessionStore>,
    config: ClientConfig,
    gate: ReadinessGate,
    state: watch::Sender<SessionState>,
    shutdown: watch::Receiver<bool>,
    backup: Option<JoinHandle<()>>,
}

impl Lifecycle {
    async fn run(mut self) {
        let restore = self.load_restore().await;

        let (tx, mut rx) = mpsc::channel(self.config.event_buffer);
        let events = tx.downgrade();

        if let Err(e) = self.engine.start(restore, tx).await {
            error!(error = %e, "Failed to start WhatsApp client");
            return;
        }

        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => {
                        self.handle(event, &events).await;
                        if self.state.borrow().is_terminal() {
                            info!("Session ended, stopping engine");
                            break;
                        }
                    }
                    None => {
                        warn!("Engine event stream closed");
                        break;
                    }
                },
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        debug!("Lifecycle received shutdown signal");
                        break;
                    }
                }
            }
        }

        if let Some(handle) = self.backup.take() {
            // The backup loop watches the same shutdown channel.
            if self.shutdown.has_changed().is_err() || *self.shutdown.borrow() {
                let _ = handle.await;
            } else {
                handle.abort();
            }
        }

        if let Err(e) = self.engine.stop().await {
            warn!(error = %e, "Failed to stop engine");
        }
    }

    fn persist_enabled(&self) -> bool {
        self.config.persist_session && !self.store.is_read_only()
    }

    async fn load_restore(&self) -> Option<SessionSnapshot> {
        let session = &self.config.session_name;

        match self.store.session_exists(session).await {
            Ok(true) => match self.store.extract(session).await {
                Ok(Some(snapshot)) => {
                    info!(session = %session, bytes = snapshot.len(), "Restoring remote session");
                    Some(snapshot)
                }
                Ok(None) => None,
                Err(e) => {
                    warn!(session = %session, error = %e, "Failed to extract remote session");
                    None
                }
            },
            Ok(false) => {
                info!(session = %session, "No remote session stored, expecting QR login");
                None
            }
            Err(e) => {
                warn!(session = %session, error = %e, "Failed to check remote session");
                None
            }
        }
    }

    async fn handle(&mut self, event: LifecycleEvent, events: &mpsc::WeakSender<LifecycleEvent>) {
        let current = *self.state.borrow();
        let next = current.transition(&event);

        if let Some(next) = next {
            if next != current {
                debug!(from = %current, to = %next, event = event.name(), "Session state changed");
            }
            self.state.send_replace(next);

            if next.is_ready() {
                self.gate.set_ready();
            } else {
                self.gate.set_not_ready();
            }
        }

        match (event, next) {
            (LifecycleEvent::RemoteSessionSaved, _) => {
                info!(session = %self.config.session_name, "Remote session saved");
            }
            (event, None) => {
                debug!(state = %current, event = event.name(), "Ignoring lifecycle event");
            }
            (LifecycleEvent::Qr(data), Some(_)) => show_qr(&data),
            (LifecycleEvent::Authenticated, Some(_)) => {
                info!("WhatsApp client authenticated");
            }
            (LifecycleEvent::Ready, Some(_)) => {
                info!("WhatsApp client is ready");
                self.start_backup(events);
            }
            (LifecycleEvent::AuthFailure(reason), Some(_)) => {
                error!(reason = %reason, "Authentication failure");
            }
            (LifecycleEvent::Disconnected(reason), Some(_)) => {
                if let Some(handle) = self.backup.take() {
                    handle.abort();
                }
                warn!(reason = %reason, "WhatsApp client disconnected, not reconnecting");

                if reason == LOGOUT_REASON && self.persist_enabled() {
                    match self.store.delete(&self.config.session_name).await {
                        Ok(()) => info!("Removed remote session after logout"),
                        Err(e) => warn!(error = %e, "Failed to remove remote session"),
                    }
                }
            }
        }
    }

    fn start_backup(&mut self, events: &mpsc::WeakSender<LifecycleEvent>) {
        if !self.persist_enabled() {
            debug!("Session persistence disabled, skipping backups");
            return;
        }
        let Some(events) = events.upgrade() else {
            return;
        };

        let handle = tokio::spawn(run_backup(
            Arc::clone(&self.engine),
            Arc::clone(&self.store),
            self.config.session_name.clone(),
            self.config.backup_interval,
            events,
            self.shutdown.clone(),
        ));
        if let Some(old) = self.backup.replace(handle) {
            old.abort();
        }
    }
}

fn show_qr(data: &str) {
    info!("QR received, scan it with WhatsApp on your phone");
    match render_qr(data) {
        Ok(rendered) => println!("\n{}", rendered),
        Err(e) => warn!(error = %e, "Could not render QR code"),
    }
}

/// Saves a snapshot immediately, then once per `period`, until shutdown.
async fn run_backup(
    engine: Arc<dyn MessagingEngine>,
    store: Arc<dyn SessionStore>,
    session: String,
    period: Duration,
    events: mpsc::Sender<LifecycleEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(period);
    debug!(period_secs = period.as_secs(), "Starting session backup loop");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match backup_once(engine.as_ref(), store.as_ref(), &session).await {
                    Ok(bytes) => {
                        debug!(session = %session, bytes, "Session backed up");
                        // Informational only; never block on a full channel.
                        let _ = events.try_send(LifecycleEvent::RemoteSessionSaved);
                    }
                    Err(e) => warn!(session = %session, error = %e, "Session backup failed"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    debug!("Session backup loop stopped");
}

async fn backup_once(
    engine: &dyn MessagingEngine,
    store: &dyn SessionStore,
    session: &str,
) -> Result<usize> {
    let snapshot = engine.snapshot().await?;
    let bytes = snapshot.len();
    store.save(session, snapshot).await?;
    Ok(bytes)
}
