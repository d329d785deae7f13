use std::time::Duration;
use serde_json::Value;
use crate::{Error, Result};

/// Application id of the stock Cast media receiver.
pub const DEFAULT_RECEIVER_APP_ID: &str = "CC1AD845";

#[derive(Debug, Clone)]
pub struct CastConfig {
    /// Receiver application id
    pub app_id: String,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Upper bound on the managed client's teardown
    pub disconnect_timeout: Duration,

    /// Timeout for the player-available request
    pub join_timeout: Duration,

    /// Timeout for a single game message
    pub send_timeout: Duration,

    /// Whether sending starts resumed
    pub start_in_foreground: bool,

    /// Extra payload attached to the player-available request
    pub player_available_extra: Option<Value>,
}

impl Default for CastConfig {
    fn default() -> Self {
        CastConfig {
            app_id: DEFAULT_RECEIVER_APP_ID.to_string(),
            connect_timeout: Duration::from_secs(10),
            disconnect_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(10),
            send_timeout: Duration::from_secs(2),
            start_in_foreground: false,
            player_available_extra: None,
        }
    }
}

impl CastConfig {
    /// Create config builder
    pub fn builder() -> CastConfigBuilder {
        CastConfigBuilder::new()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.app_id.is_empty() {
            return Err(Error::config("Receiver app id must not be empty"));
        }

        if !self.app_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::config(format!(
                "Receiver app id must be alphanumeric: {}",
                self.app_id
            )));
        }

        let timeouts = [
            ("connect_timeout", self.connect_timeout),
            ("disconnect_timeout", self.disconnect_timeout),
            ("join_timeout", self.join_timeout),
            ("send_timeout", self.send_timeout),
        ];
        for (name, timeout) in timeouts {
            if timeout.is_zero() {
                return Err(Error::config(format!("{} must be non-zero", name)));
            }
        }

        Ok(())
    }
}

/// Builder for CastConfig
pub struct CastConfigBuilder {
    config: CastConfig,
}

impl CastConfigBuilder {
    /// Create new builder
    pub fn new() -> Self {
        CastConfigBuilder {
            config: CastConfig::default(),
        }
    }

    /// Set receiver app id
    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.config.app_id = app_id.into();
        self
    }

    /// Set connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set disconnect timeout
    pub fn disconnect_timeout(mut self, timeout: Duration) -> Self {
        self.config.disconnect_timeout = timeout;
        self
    }

    /// Set join request timeout
    pub fn join_timeout(mut self, timeout: Duration) -> Self {
        self.config.join_timeout = timeout;
        self
    }

    /// Set per-message send timeout
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.config.send_timeout = timeout;
        self
    }

    /// Start with sending resumed
    pub fn start_in_foreground(mut self, enabled: bool) -> Self {
        self.config.start_in_foreground = enabled;
        self
    }

    /// Attach extra data to the player-available request
    pub fn player_available_extra(mut self, extra: Value) -> Self {
        self.config.player_available_extra = Some(extra);
        self
    }

    /// Build configuration
    pub fn build(self) -> Result<CastConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for CastConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
