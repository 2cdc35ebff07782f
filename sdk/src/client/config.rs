//! Client configuration.
//!
//! Provides configuration options for the sync client.

use crate::gateway::DEFAULT_RATES_COUNT;
use crate::store::Subscription;
use crate::types::primitives::validate_symbol;
use crate::types::Timeframe;
use crate::ws::WsConfig;

use super::error::ClientError;

/// Default symbol, matching the bridge's own default.
pub const DEFAULT_SYMBOL: &str = "XAUUSDc";

/// Default timeframe.
pub const DEFAULT_TIMEFRAME: Timeframe = Timeframe::M15;

/// Sync client configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Transport configuration.
    pub ws: WsConfig,

    /// Subscription tracked at start-up.
    pub subscription: Subscription,

    /// Number of candles requested per `get_rates`.
    pub rates_count: u32,

    /// Re-request the series and positions every time the socket connects.
    pub resync_on_connect: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            ws: WsConfig::default(),
            subscription: Subscription::new(DEFAULT_SYMBOL, DEFAULT_TIMEFRAME),
            rates_count: DEFAULT_RATES_COUNT,
            resync_on_connect: true,
        }
    }
}

impl SyncConfig {
    /// Creates a configuration for the bridge at `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            ws: WsConfig::new(url),
            ..Default::default()
        }
    }

    /// Replaces the transport configuration.
    #[must_use]
    pub fn with_ws(mut self, ws: WsConfig) -> Self {
        self.ws = ws;
        self
    }

    /// Sets the initial subscription.
    #[must_use]
    pub fn with_subscription(mut self, symbol: impl Into<String>, timeframe: Timeframe) -> Self {
        self.subscription = Subscription::new(symbol, timeframe);
        self
    }

    /// Sets the candle count per request.
    #[must_use]
    pub fn with_rates_count(mut self, count: u32) -> Self {
        self.rates_count = count;
        self
    }

    /// Enables or disables the resync on connect.
    #[must_use]
    pub fn with_resync_on_connect(mut self, enabled: bool) -> Self {
        self.resync_on_connect = enabled;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ClientError> {
        self.ws.validate()?;

        if validate_symbol(&self.subscription.symbol).is_err() {
            return Err(ClientError::InvalidConfig(
                "symbol cannot be empty".to_string(),
            ));
        }

        if self.rates_count == 0 {
            return Err(ClientError::InvalidConfig(
                "rates_count must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::config::DEFAULT_WS_URL;
    use tokio_test::assert_err;

    #[test]
    fn test_config_default() {
        let config = SyncConfig::default();
        assert_eq!(config.ws.url, DEFAULT_WS_URL);
        assert_eq!(config.subscription.symbol, DEFAULT_SYMBOL);
        assert_eq!(config.subscription.timeframe, Timeframe::M15);
        assert_eq!(config.rates_count, 500);
        assert!(config.resync_on_connect);
    }

    #[test]
    fn test_config_builder() {
        let config = SyncConfig::new("ws://127.0.0.1:9000")
            .with_subscription("EURUSD", Timeframe::H4)
            .with_rates_count(100)
            .with_resync_on_connect(false);

        assert_eq!(config.ws.url, "ws://127.0.0.1:9000");
        assert_eq!(config.subscription, Subscription::new("EURUSD", Timeframe::H4));
        assert_eq!(config.rates_count, 100);
        assert!(!config.resync_on_connect);
    }

    #[test]
    fn test_config_validate_valid() {
        assert!(SyncConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validate_zero_count() {
        let result = SyncConfig::default().with_rates_count(0).validate();
        assert!(matches!(result, Err(ClientError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_validate_empty_symbol() {
        assert_err!(SyncConfig::default()
            .with_subscription("  ", Timeframe::M1)
            .validate());
    }

    #[test]
    fn test_config_validate_bad_url() {
        let result = SyncConfig::new("http://localhost:8765").validate();
        assert!(matches!(result, Err(ClientError::Transport(_))));
    }
}
