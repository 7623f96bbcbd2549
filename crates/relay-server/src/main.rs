//! WhatsApp relay binary.
//!
//! Start the relay with:
//! ```bash
//! MONGO_URI=mongodb://localhost:27017/whatsapp cargo run -p relay-server
//! ```

use std::process::ExitCode;

use clap::Parser;
use relay_server::{install_panic_hook, log_filter, run, Args, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Environment files first so clap sees their values
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());

    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_filter(args.verbose)))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    install_panic_hook();

    let config = match ServerConfig::try_from(args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        bind = %config.api.bind_address(),
        session = %config.client.session_name,
        "Starting WhatsApp relay"
    );

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Relay failed");
            ExitCode::FAILURE
        }
    }
}
