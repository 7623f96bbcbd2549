//! Messaging client configuration.

use std::time::Duration;

/// Session name used when none is configured.
pub const DEFAULT_SESSION_NAME: &str = "RemoteAuth";

/// Shortest allowed interval between session backups.
pub const MIN_BACKUP_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for the messaging client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Key under which the session snapshot is stored.
    pub session_name: String,
    /// Whether session updates are written back to the store.
    pub persist_session: bool,
    /// How often a ready session is backed up.
    pub backup_interval: Duration,
    /// Upper bound for one outbound send.
    pub send_timeout: Duration,
    /// Capacity of the lifecycle event channel.
    pub event_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            session_name: DEFAULT_SESSION_NAME.to_string(),
            persist_session: true,
            backup_interval: Duration::from_secs(300),
            send_timeout: Duration::from_secs(60),
            event_buffer: 32,
        }
    }
}

impl ClientConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the session name.
    pub fn with_session_name(mut self, name: impl Into<String>) -> Self {
        self.session_name = name.into();
        self
    }

    /// Enables or disables writing session updates to the store.
    pub fn with_persist_session(mut self, persist: bool) -> Self {
        self.persist_session = persist;
        self
    }

    /// Sets the backup interval, clamped to [`MIN_BACKUP_INTERVAL`].
    pub fn with_backup_interval(mut self, interval: Duration) -> Self {
        self.backup_interval = interval.max(MIN_BACKUP_INTERVAL);
        self
    }

    /// Sets the send timeout.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();

        assert_eq!(config.session_name, "RemoteAuth");
        assert!(config.persist_session);
        assert_eq!(config.backup_interval, Duration::from_secs(300));
        assert_eq!(config.send_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new()
            .with_session_name("shop-bot")
            .with_persist_session(false)
            .with_backup_interval(Duration::from_secs(120))
            .with_send_timeout(Duration::from_secs(5));

        assert_eq!(config.session_name, "shop-bot");
        assert!(!config.persist_session);
        assert_eq!(config.backup_interval, Duration::from_secs(120));
        assert_eq!(config.send_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_backup_interval_is_clamped() {
        let config = ClientConfig::new().with_backup_interval(Duration::from_secs(5));
        assert_eq!(config.backup_interval, MIN_BACKUP_INTERVAL);
    }
}
