//! Engine implementation backed by a local automation sidecar.
//!
//! The sidecar hosts the browser session and exposes a small HTTP API:
//!
//! ```text
//! POST {base}/session/start              start login, optionally restoring
//! GET  {base}/session/events?session=&after=
//!                                        lifecycle events newer than `after`
//! GET  {base}/session/snapshot?session=  current credentials (base64)
//! POST {base}/messages                   send text or media
//! ```

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use relay_store::SessionSnapshot;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::chat::{ChatId, MessagePayload};
use crate::error::{ClientError, Result};
use crate::engine::MessagingEngine;
use crate::event::LifecycleEvent;

/// Default sidecar address.
pub const DEFAULT_BRIDGE_URL: &str = "http://127.0.0.1:3000";

/// Configuration for [`BridgeEngine`].
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Base URL of the sidecar.
    pub base_url: String,
    /// Session name forwarded to the sidecar.
    pub session_name: String,
    /// How often lifecycle events are polled.
    pub poll_interval: Duration,
    /// Arguments for the headless browser.
    pub browser_args: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BRIDGE_URL.to_string(),
            session_name: crate::config::DEFAULT_SESSION_NAME.to_string(),
            poll_interval: Duration::from_secs(1),
            browser_args: vec![
                "--no-sandbox".to_string(),
                "--disable-setuid-sandbox".to_string(),
            ],
        }
    }
}

impl BridgeConfig {
    /// Creates a config for the sidecar at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Sets the session name.
    pub fn with_session_name(mut self, name: impl Into<String>) -> Self {
        self.session_name = name.into();
        self
    }

    /// Sets the event poll interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

#[derive(Serialize)]
struct StartRequest<'a> {
    session: &'a str,
    restore: Option<String>,
    browser_args: &'a [String],
}

#[derive(Debug, Deserialize)]
struct BridgeEvent {
    seq: u64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<String>,
}

#[derive(Deserialize)]
struct SnapshotResponse {
    data: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    session: &'a str,
    chat_id: &'a str,
    content: Content<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Content<'a> {
    Text {
        body: &'a str,
    },
    Media {
        mimetype: &'a str,
        data: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        filename: Option<&'a str>,
    },
}

/// Engine that drives a WhatsApp Web sidecar over HTTP.
pub struct BridgeEngine {
    http: reqwest::Client,
    base_url: Url,
    config: BridgeConfig,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl BridgeEngine {
    /// Creates an engine for the configured sidecar.
    pub fn new(config: BridgeConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| ClientError::Engine(format!("invalid bridge URL: {}", e)))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            config,
            poller: Mutex::new(None),
        })
    }

    /// Returns the sidecar base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        endpoint(&self.base_url, path)
    }

    async fn check(response: reqwest::Response, operation: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        debug!(status = %status, body = %body, "Bridge request failed");
        Err(ClientError::Engine(format!(
            "{} rejected by bridge: {}",
            operation, status
        )))
    }
}

fn endpoint(base: &Url, path: &str) -> Result<Url> {
    let joined = format!("{}/{}", base.as_str().trim_end_matches('/'), path);
    Url::parse(&joined).map_err(|e| ClientError::Engine(format!("invalid bridge URL: {}", e)))
}

#[async_trait]
impl MessagingEngine for BridgeEngine {
    fn name(&self) -> &str {
        "bridge"
    }

    async fn start(
        &self,
        restore: Option<SessionSnapshot>,
        events: mpsc::Sender<LifecycleEvent>,
    ) -> Result<()> {
        let restoring = restore.is_some();
        let request = StartRequest {
            session: &self.config.session_name,
            restore: restore.map(|s| STANDARD.encode(s.as_bytes())),
            browser_args: &self.config.browser_args,
        };

        info!(
            url = %self.base_url,
            session = %self.config.session_name,
            restoring,
            "Starting bridge session"
        );

        let response = self
            .http
            .post(self.endpoint("session/start")?)
            .json(&request)
            .send()
            .await?;
        Self::check(response, "session start").await?;

        let mut events_url = self.endpoint("session/events")?;
        events_url
            .query_pairs_mut()
            .append_pair("session", &self.config.session_name);

        let handle = tokio::spawn(poll_events(
            self.http.clone(),
            events_url,
            self.config.poll_interval,
            events,
        ));

        let mut poller = self.poller.lock().await;
        if let Some(old) = poller.replace(handle) {
            old.abort();
        }
        Ok(())
    }

    async fn send_message(&self, chat_id: &ChatId, payload: &MessagePayload) -> Result<()> {
        let request = match payload {
            MessagePayload::Text(body) => SendRequest {
                session: &self.config.session_name,
                chat_id: chat_id.as_str(),
                content: Content::Text {
                    body: body.as_str(),
                },
                caption: None,
            },
            MessagePayload::Media { media, caption } => SendRequest {
                session: &self.config.session_name,
                chat_id: chat_id.as_str(),
                content: Content::Media {
                    mimetype: &media.mimetype,
                    data: media.to_base64(),
                    filename: media.filename.as_deref(),
                },
                caption: caption.as_deref(),
            },
        };

        let response = self
            .http
            .post(self.endpoint("messages")?)
            .json(&request)
            .send()
            .await?;
        Self::check(response, "send").await?;

        debug!(chat_id = %chat_id, kind = payload.kind(), "Message accepted by bridge");
        Ok(())
    }

    async fn snapshot(&self) -> Result<SessionSnapshot> {
        let mut url = self.endpoint("session/snapshot")?;
        url.query_pairs_mut()
            .append_pair("session", &self.config.session_name);

        let response = self.http.get(url).send().await?;
        let response = Self::check(response, "snapshot").await?;
        let body: SnapshotResponse = response.json().await?;

        let data = STANDARD
            .decode(body.data.as_bytes())
            .map_err(|e| ClientError::Engine(format!("snapshot is not base64: {}", e)))?;
        Ok(SessionSnapshot::new(data))
    }

    async fn stop(&self) -> Result<()> {
        if let Some(handle) = self.poller.lock().await.take() {
            handle.abort();
            debug!("Bridge event poller stopped");
        }
        Ok(())
    }
}

/// Polls the sidecar for lifecycle events and forwards them in order.
///
/// Runs until the receiving side is dropped. Poll failures are logged and
/// retried on the next tick.
async fn poll_events(
    http: reqwest::Client,
    events_url: Url,
    poll_interval: Duration,
    events: mpsc::Sender<LifecycleEvent>,
) {
    let mut ticker = interval(poll_interval);
    let mut after = 0u64;

    loop {
        ticker.tick().await;
        if events.is_closed() {
            break;
        }

        let mut url = events_url.clone();
        url.query_pairs_mut().append_pair("after", &after.to_string());

        let batch = match fetch_events(&http, url).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!(error = %e, "Failed to poll bridge events");
                continue;
            }
        };

        // A restarted sidecar numbers its events from 1 again
        if let Some(newest) = batch.iter().map(|e| e.seq).max() {
            if newest < after {
                warn!(newest, after, "Bridge event sequence went backwards, resetting");
                after = 0;
            }
        }

        for event in batch {
            if event.seq <= after {
                continue;
            }
            after = event.seq;

            trace!(seq = event.seq, kind = %event.kind, "Bridge event");
            match LifecycleEvent::from_wire(&event.kind, event.data) {
                Some(lifecycle) => {
                    if events.send(lifecycle).await.is_err() {
                        debug!("Event receiver dropped, stopping bridge poller");
                        return;
                    }
                }
                None => debug!(kind = %event.kind, "Ignoring unknown bridge event"),
            }
        }
    }
}

async fn fetch_events(http: &reqwest::Client, url: Url) -> Result<Vec<BridgeEvent>> {
    let response = http.get(url).send().await?;
    let response = BridgeEngine::check(response, "event poll").await?;
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaAttachment;
    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct FakeBridge {
        starts: Arc<Mutex<Vec<Value>>>,
        sends: Arc<Mutex<Vec<Value>>>,
        polls: Arc<Mutex<Vec<u64>>>,
    }

    async fn start(State(bridge): State<FakeBridge>, Json(body): Json<Value>) -> StatusCode {
        bridge.starts.lock().await.push(body);
        StatusCode::OK
    }

    async fn events(
        State(bridge): State<FakeBridge>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Json<Value> {
        let after: u64 = query.get("after").and_then(|a| a.parse().ok()).unwrap_or(0);
        bridge.polls.lock().await.push(after);

        let all = vec![
            json!({ "seq": 1, "type": "qr", "data": "2@qr-payload" }),
            json!({ "seq": 2, "type": "message_ack" }),
            json!({ "seq": 3, "type": "authenticated" }),
            json!({ "seq": 4, "type": "ready" }),
        ];
        let newer: Vec<Value> = all
            .into_iter()
            .filter(|e| e["seq"].as_u64().unwrap_or(0) > after)
            .collect();
        Json(Value::Array(newer))
    }

    async fn snapshot(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
        assert_eq!(query.get("session").map(String::as_str), Some("RemoteAuth"));
        Json(json!({ "data": STANDARD.encode(b"session-zip") }))
    }

    async fn messages(State(bridge): State<FakeBridge>, Json(body): Json<Value>) -> StatusCode {
        let rejected = body["chat_id"] == "0@c.us";
        bridge.sends.lock().await.push(body);
        if rejected {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::OK
        }
    }

    async fn spawn_bridge() -> (FakeBridge, String) {
        let bridge = FakeBridge::default();
        let app = Router::new()
            .route("/session/start", post(start))
            .route("/session/events", get(events))
            .route("/session/snapshot", get(snapshot))
            .route("/messages", post(messages))
            .with_state(bridge.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (bridge, format!("http://{}", addr))
    }

    fn engine_for(base: &str) -> BridgeEngine {
        BridgeEngine::new(
            BridgeConfig::new(format!("{}/", base)).with_poll_interval(Duration::from_millis(10)),
        )
        .unwrap()
    }

    /// Sidecar that ignores `after` and restarts its numbering after the
    /// first poll.
    async fn spawn_restarting_bridge() -> String {
        let polls = Arc::new(Mutex::new(0u32));
        let app = Router::new()
            .route("/session/start", post(|| async { StatusCode::OK }))
            .route(
                "/session/events",
                get(move || {
                    let polls = polls.clone();
                    async move {
                        let mut polls = polls.lock().await;
                        *polls += 1;
                        if *polls == 1 {
                            Json(json!([{ "seq": 7, "type": "authenticated" }]))
                        } else {
                            Json(json!([{ "seq": 1, "type": "ready" }]))
                        }
                    }
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_bridge_config_default() {
        let config = BridgeConfig::default();
        assert_eq!(config.base_url, DEFAULT_BRIDGE_URL);
        assert_eq!(config.session_name, "RemoteAuth");
        assert_eq!(
            config.browser_args,
            vec!["--no-sandbox", "--disable-setuid-sandbox"]
        );
    }

    #[test]
    fn test_invalid_bridge_url() {
        assert!(matches!(
            BridgeEngine::new(BridgeConfig::new("not a url")),
            Err(ClientError::Engine(_))
        ));
    }

    #[test]
    fn test_endpoint_join() {
        let base = Url::parse("http://127.0.0.1:3000/wa").unwrap();
        assert_eq!(
            endpoint(&base, "session/start").unwrap().as_str(),
            "http://127.0.0.1:3000/wa/session/start"
        );
    }

    #[tokio::test]
    async fn test_start_forwards_events_in_order() {
        let (bridge, base) = spawn_bridge().await;
        let engine = engine_for(&base);
        let (tx, mut rx) = mpsc::channel(8);

        engine
            .start(Some(SessionSnapshot::new(b"saved".to_vec())), tx)
            .await
            .unwrap();

        assert_eq!(rx.recv().await, Some(LifecycleEvent::Qr("2@qr-payload".into())));
        assert_eq!(rx.recv().await, Some(LifecycleEvent::Authenticated));
        assert_eq!(rx.recv().await, Some(LifecycleEvent::Ready));

        let starts = bridge.starts.lock().await;
        assert_eq!(starts.len(), 1);
        assert_eq!(starts[0]["session"], "RemoteAuth");
        assert_eq!(starts[0]["restore"], STANDARD.encode(b"saved"));
        assert_eq!(starts[0]["browser_args"][0], "--no-sandbox");
        drop(starts);

        // Later polls only ask for newer events
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(bridge.polls.lock().await.iter().any(|after| *after == 4));

        engine.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_sequence_reset_after_sidecar_restart() {
        let base = spawn_restarting_bridge().await;
        let engine = engine_for(&base);
        let (tx, mut rx) = mpsc::channel(8);

        engine.start(None, tx).await.unwrap();

        let first = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
        assert_eq!(first, Some(LifecycleEvent::Authenticated));
        let second = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
        assert_eq!(second, Some(LifecycleEvent::Ready));

        // The repeated seq 1 is not forwarded twice
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());

        engine.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_start_without_restore_sends_null() {
        let (bridge, base) = spawn_bridge().await;
        let engine = engine_for(&base);
        let (tx, _rx) = mpsc::channel(8);

        engine.start(None, tx).await.unwrap();
        engine.stop().await.unwrap();

        let starts = bridge.starts.lock().await;
        assert!(starts[0]["restore"].is_null());
    }

    #[tokio::test]
    async fn test_send_text_and_media() {
        let (bridge, base) = spawn_bridge().await;
        let engine = engine_for(&base);
        let chat = ChatId::from_phone("15551234567").unwrap();

        engine
            .send_message(&chat, &MessagePayload::text("hello"))
            .await
            .unwrap();

        let media = MediaAttachment::new("image/png", b"png".to_vec(), Some("qr.png".into()));
        engine
            .send_message(&chat, &MessagePayload::media_with_caption(media, "your code"))
            .await
            .unwrap();

        let sends = bridge.sends.lock().await;
        assert_eq!(sends.len(), 2);

        assert_eq!(sends[0]["chat_id"], "15551234567@c.us");
        assert_eq!(sends[0]["content"]["type"], "text");
        assert_eq!(sends[0]["content"]["body"], "hello");
        assert!(sends[0].get("caption").is_none());

        assert_eq!(sends[1]["content"]["type"], "media");
        assert_eq!(sends[1]["content"]["mimetype"], "image/png");
        assert_eq!(sends[1]["content"]["data"], STANDARD.encode(b"png"));
        assert_eq!(sends[1]["content"]["filename"], "qr.png");
        assert_eq!(sends[1]["caption"], "your code");
    }

    #[tokio::test]
    async fn test_send_rejected_by_bridge() {
        let (_bridge, base) = spawn_bridge().await;
        let engine = engine_for(&base);
        let chat = ChatId::from_phone("0").unwrap();

        let result = engine
            .send_message(&chat, &MessagePayload::text("hello"))
            .await;
        assert!(matches!(result, Err(ClientError::Engine(_))));
    }

    #[tokio::test]
    async fn test_snapshot_decodes_base64() {
        let (_bridge, base) = spawn_bridge().await;
        let engine = engine_for(&base);

        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.as_bytes(), b"session-zip");
    }

    #[tokio::test]
    async fn test_unreachable_bridge() {
        // Port 9 (discard) is almost never listening locally
        let engine = engine_for("http://127.0.0.1:9");
        let (tx, _rx) = mpsc::channel(1);
        assert!(engine.start(None, tx).await.is_err());
    }
}
