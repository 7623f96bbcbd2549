//! Process wiring: store, client and HTTP server.

use std::sync::Arc;

use relay_api::{serve, AppState};
use relay_client::{BridgeEngine, MediaFetcher, MessagingClient, ReadinessGate};
use relay_store::{MongoStore, ReadOnlyStore, SessionStore};
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::error::Result;

/// Connects the store, starts the messaging client and serves HTTP until a
/// shutdown signal arrives.
pub async fn run(config: ServerConfig) -> Result<()> {
    let mongo = MongoStore::connect(&config.mongo_uri, config.mongo_db.as_deref()).await?;
    info!(database = mongo.database_name(), "Connected to MongoDB");

    let store: Arc<dyn SessionStore> = if config.client.persist_session {
        Arc::new(mongo)
    } else {
        info!("Session persistence disabled, stored session is restore-only");
        Arc::new(ReadOnlyStore::new(mongo))
    };

    let engine = Arc::new(BridgeEngine::new(config.bridge.clone())?);
    info!(bridge = %engine.base_url(), "Using WhatsApp Web bridge");

    let client = Arc::new(MessagingClient::initialize(
        engine,
        store,
        config.client.clone(),
        ReadinessGate::new(),
    ));

    let state = AppState::new(
        Arc::clone(&client),
        MediaFetcher::with_timeout(config.media_timeout),
    );

    let served = serve(config.api.clone(), state, shutdown_signal()).await;

    client.shutdown().await;
    served?;

    info!("Relay stopped");
    Ok(())
}

/// Completes on Ctrl+C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
    info!("Shutdown signal received, stopping server...");
}

/// Routes panics, including those in spawned tasks, to the log.
///
/// Panicking tasks end on their own; the process keeps serving.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let payload = panic_info.payload();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());

        error!(
            panic = true,
            location = ?panic_info.location(),
            "Panic occurred: {}",
            message
        );
    }));
}
