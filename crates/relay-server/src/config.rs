//! Command-line and environment configuration.

use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use relay_api::{ApiConfig, DEFAULT_HOST, DEFAULT_PORT};
use relay_client::{BridgeConfig, ClientConfig, DEFAULT_BRIDGE_URL, DEFAULT_SESSION_NAME};

use crate::error::ConfigError;

/// WhatsApp relay - send WhatsApp messages over HTTP
#[derive(Parser, Debug, Clone)]
#[command(name = "wa-relay")]
#[command(about = "HTTP relay that sends WhatsApp messages through a linked session")]
pub struct Args {
    /// MongoDB connection string used for session storage
    #[arg(long, env = "MONGO_URI", hide_env_values = true)]
    pub mongo_uri: Option<String>,

    /// Database name (default: from the URI, else "whatsapp")
    #[arg(long, env = "MONGO_DB")]
    pub mongo_db: Option<String>,

    /// Host to bind the HTTP server to
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to bind the HTTP server to
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Base URL of the WhatsApp Web automation sidecar
    #[arg(long, env = "WA_BRIDGE_URL", default_value = DEFAULT_BRIDGE_URL)]
    pub bridge_url: String,

    /// Name under which the session is stored
    #[arg(long, env = "WA_SESSION_NAME", default_value = DEFAULT_SESSION_NAME)]
    pub session_name: String,

    /// Save session updates to the store (false = restore only)
    #[arg(
        long,
        env = "WA_PERSIST_SESSION",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub persist_session: bool,

    /// Seconds between session backups (minimum 60)
    #[arg(long, env = "WA_BACKUP_INTERVAL_SECS", default_value_t = 300)]
    pub backup_interval_secs: u64,

    /// Seconds to wait for a message to be sent
    #[arg(long, env = "WA_SEND_TIMEOUT_SECS", default_value_t = 60)]
    pub send_timeout_secs: u64,

    /// Seconds to wait for a media download
    #[arg(long, env = "WA_MEDIA_TIMEOUT_SECS", default_value_t = 30)]
    pub media_timeout_secs: u64,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Validated server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// MongoDB connection string.
    pub mongo_uri: String,
    /// Explicit database name, if any.
    pub mongo_db: Option<String>,
    /// HTTP server settings.
    pub api: ApiConfig,
    /// Automation sidecar settings.
    pub bridge: BridgeConfig,
    /// Messaging client settings.
    pub client: ClientConfig,
    /// Media download timeout.
    pub media_timeout: Duration,
}

impl TryFrom<Args> for ServerConfig {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let mongo_uri = args
            .mongo_uri
            .map(|uri| uri.trim().to_string())
            .filter(|uri| !uri.is_empty())
            .ok_or(ConfigError::MissingMongoUri)?;

        let session_name = args.session_name.trim().to_string();
        if session_name.is_empty() {
            return Err(ConfigError::Invalid {
                name: "session name",
                reason: "must not be empty".into(),
            });
        }
        if args.send_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "send timeout",
                reason: "must be at least one second".into(),
            });
        }
        if args.media_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "media timeout",
                reason: "must be at least one second".into(),
            });
        }

        let mongo_db = args
            .mongo_db
            .map(|db| db.trim().to_string())
            .filter(|db| !db.is_empty());

        let client = ClientConfig::new()
            .with_session_name(session_name.clone())
            .with_persist_session(args.persist_session)
            .with_backup_interval(Duration::from_secs(args.backup_interval_secs))
            .with_send_timeout(Duration::from_secs(args.send_timeout_secs));

        Ok(Self {
            mongo_uri,
            mongo_db,
            api: ApiConfig::new(args.host, args.port),
            bridge: BridgeConfig::new(args.bridge_url).with_session_name(session_name),
            client,
            media_timeout: Duration::from_secs(args.media_timeout_secs),
        })
    }
}

/// Log filter for a `-v` count. `RUST_LOG` takes precedence when set.
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "wa_relay=info,relay_server=info,relay_api=info,relay_client=info,relay_store=info,tower_http=warn,mongodb=warn",
        1 => "wa_relay=debug,relay_server=debug,relay_api=debug,relay_client=debug,relay_store=debug,tower_http=info,mongodb=info",
        2 => "wa_relay=trace,relay_server=trace,relay_api=trace,relay_client=trace,relay_store=trace,tower_http=debug,mongodb=debug",
        _ => "trace",
    }
}
