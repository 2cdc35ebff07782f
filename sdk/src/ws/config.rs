//! Transport configuration for the bridge socket.
//!
//! Provides configuration options for the bridge connection.

use std::time::Duration;

/// Default bridge endpoint.
pub const DEFAULT_WS_URL: &str = "ws://localhost:8765";

/// Default heartbeat interval in seconds.
pub const DEFAULT_HEARTBEAT_SECS: u64 = 30;

/// Default reconnect delay in seconds.
pub const DEFAULT_RECONNECT_DELAY_SECS: u64 = 1;

/// Maximum reconnect delay in seconds.
pub const MAX_RECONNECT_DELAY_SECS: u64 = 30;

/// Default jitter fraction applied on top of each reconnect delay.
pub const DEFAULT_RECONNECT_JITTER: f64 = 0.3;

/// Default capacity of the inbound frame channel.
pub const DEFAULT_INBOUND_CAPACITY: usize = 1000;

/// Reconnection policy.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Whether to reconnect automatically after an unexpected close.
    pub enabled: bool,

    /// Initial reconnect delay.
    pub initial_delay: Duration,

    /// Maximum reconnect delay.
    pub max_delay: Duration,

    /// Fraction of the delay added as random jitter (0.0 disables).
    pub jitter: f64,

    /// Maximum reconnection attempts per outage (None = unlimited).
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay: Duration::from_secs(DEFAULT_RECONNECT_DELAY_SECS),
            max_delay: Duration::from_secs(MAX_RECONNECT_DELAY_SECS),
            jitter: DEFAULT_RECONNECT_JITTER,
            max_attempts: None,
        }
    }
}

/// WebSocket configuration.
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket URL.
    pub url: String,

    /// Heartbeat (ping) interval, None disables heartbeats.
    pub heartbeat_interval: Option<Duration>,

    /// Reconnection policy.
    pub reconnect: ReconnectPolicy,

    /// Capacity of the inbound frame channel.
    pub inbound_capacity: usize,

    /// Whether outbound commands carry a `request_id`.
    pub request_ids: bool,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WS_URL.to_string(),
            heartbeat_interval: Some(Duration::from_secs(DEFAULT_HEARTBEAT_SECS)),
            reconnect: ReconnectPolicy::default(),
            inbound_capacity: DEFAULT_INBOUND_CAPACITY,
            request_ids: true,
        }
    }
}

impl WsConfig {
    /// Creates a new configuration with the given URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = Some(interval);
        self
    }

    /// Disables heartbeats.
    #[must_use]
    pub fn without_heartbeat(mut self) -> Self {
        self.heartbeat_interval = None;
        self
    }

    /// Sets the initial reconnect delay.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect.initial_delay = delay;
        self
    }

    /// Sets the maximum reconnect delay.
    #[must_use]
    pub fn with_max_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect.max_delay = delay;
        self
    }

    /// Sets the maximum reconnection attempts.
    #[must_use]
    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.reconnect.max_attempts = Some(attempts);
        self
    }

    /// Sets the reconnect jitter fraction.
    #[must_use]
    pub fn with_reconnect_jitter(mut self, jitter: f64) -> Self {
        self.reconnect.jitter = jitter;
        self
    }

    /// Enables or disables automatic reconnection.
    #[must_use]
    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.reconnect.enabled = enabled;
        self
    }

    /// Sets the inbound channel capacity.
    #[must_use]
    pub fn with_inbound_capacity(mut self, capacity: usize) -> Self {
        self.inbound_capacity = capacity;
        self
    }

    /// Enables or disables `request_id` on outbound commands.
    #[must_use]
    pub fn with_request_ids(mut self, enabled: bool) -> Self {
        self.request_ids = enabled;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), super::error::WsError> {
        if self.url.is_empty() {
            return Err(super::error::WsError::InvalidConfig(
                "url cannot be empty".to_string(),
            ));
        }

        if !self.url.starts_with("ws://") && !self.url.starts_with("wss://") {
            return Err(super::error::WsError::InvalidConfig(
                "url must start with ws:// or wss://".to_string(),
            ));
        }

        if self.inbound_capacity == 0 {
            return Err(super::error::WsError::InvalidConfig(
                "inbound_capacity must be > 0".to_string(),
            ));
        }

        if self.heartbeat_interval.is_some_and(|d| d.is_zero()) {
            return Err(super::error::WsError::InvalidConfig(
                "heartbeat_interval must be > 0".to_string(),
            ));
        }

        if self.reconnect.initial_delay > self.reconnect.max_delay {
            return Err(super::error::WsError::InvalidConfig(
                "reconnect delay must be <= max reconnect delay".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.reconnect.jitter) {
            return Err(super::error::WsError::InvalidConfig(
                "reconnect jitter must be within 0.0..=1.0".to_string(),
            ));
        }

        Ok(())
    }
}
