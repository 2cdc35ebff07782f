//! Terminal configuration.
//!
//! Loaded from environment variables, falling back to the bridge defaults.

use bridgesync_sdk::client::config::{DEFAULT_SYMBOL, DEFAULT_TIMEFRAME};
use bridgesync_sdk::gateway::DEFAULT_RATES_COUNT;
use bridgesync_sdk::ws::config::DEFAULT_WS_URL;
use bridgesync_sdk::ws::WsConfig;
use bridgesync_sdk::{SyncConfig, Timeframe, Volume};
use serde::{Deserialize, Serialize};

/// Bridge endpoint.
pub const ENV_WS_URL: &str = "BRIDGE_WS_URL";
/// Initial symbol.
pub const ENV_SYMBOL: &str = "TERMINAL_SYMBOL";
/// Initial timeframe.
pub const ENV_TIMEFRAME: &str = "TERMINAL_TIMEFRAME";
/// Order volume used when a command gives none.
pub const ENV_VOLUME: &str = "TERMINAL_VOLUME";
/// Candles requested per series.
pub const ENV_RATES_COUNT: &str = "TERMINAL_RATES_COUNT";
/// Whether to reconnect after the socket drops.
pub const ENV_AUTO_RECONNECT: &str = "TERMINAL_AUTO_RECONNECT";

/// Default order volume in lots.
pub const DEFAULT_VOLUME: f64 = 0.01;

/// Configuration for the terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Bridge WebSocket URL.
    pub url: String,

    /// Symbol tracked at start-up.
    pub symbol: String,

    /// Timeframe tracked at start-up.
    pub timeframe: Timeframe,

    /// Order volume used when a command gives none.
    pub default_volume: f64,

    /// Candles requested per series.
    pub rates_count: u32,

    /// Whether to reconnect after the socket drops.
    pub auto_reconnect: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WS_URL.to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
            timeframe: DEFAULT_TIMEFRAME,
            default_volume: DEFAULT_VOLUME,
            rates_count: DEFAULT_RATES_COUNT,
            auto_reconnect: true,
        }
    }
}

impl TerminalConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable value or the
    /// result fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, using defaults for unset
    /// keys.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be parsed or validation fails.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_WS_URL) {
            config.url = url;
        }
        if let Some(symbol) = lookup(ENV_SYMBOL) {
            config.symbol = symbol;
        }
        if let Some(raw) = lookup(ENV_TIMEFRAME) {
            config.timeframe = raw
                .parse()
                .map_err(|_| ConfigError::InvalidTimeframe(raw.clone()))?;
        }
        if let Some(raw) = lookup(ENV_VOLUME) {
            config.default_volume = parse_var(ENV_VOLUME, &raw)?;
        }
        if let Some(raw) = lookup(ENV_RATES_COUNT) {
            config.rates_count = parse_var(ENV_RATES_COUNT, &raw)?;
        }
        if let Some(raw) = lookup(ENV_AUTO_RECONNECT) {
            config.auto_reconnect = parse_flag(ENV_AUTO_RECONNECT, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }

        if !Volume::new(self.default_volume).is_tradable() {
            return Err(ConfigError::InvalidVolume(self.default_volume));
        }

        if self.rates_count == 0 {
            return Err(ConfigError::InvalidRatesCount);
        }

        self.to_sync_config()
            .validate()
            .map_err(|e| ConfigError::InvalidClient(e.to_string()))
    }

    /// Builds the sync client configuration.
    #[must_use]
    pub fn to_sync_config(&self) -> SyncConfig {
        let ws = WsConfig::new(self.url.clone()).with_auto_reconnect(self.auto_reconnect);

        SyncConfig::default()
            .with_ws(ws)
            .with_subscription(self.symbol.clone(), self.timeframe)
            .with_rates_count(self.rates_count)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: raw.to_string(),
    })
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var,
            value: raw.to_string(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Symbol is empty.
    #[error("symbol cannot be empty")]
    EmptySymbol,

    /// Unknown timeframe label.
    #[error("invalid timeframe: {0}")]
    InvalidTimeframe(String),

    /// Default volume is not tradable.
    #[error("default volume must be positive, got {0}")]
    InvalidVolume(f64),

    /// Rates count is zero.
    #[error("rates count must be > 0")]
    InvalidRatesCount,

    /// A numeric variable could not be parsed.
    #[error("{var} is not a valid number: {value:?}")]
    InvalidNumber {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// A boolean variable could not be parsed.
    #[error("{var} is not a valid flag: {value:?}")]
    InvalidFlag {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// The derived client configuration was rejected.
    #[error("invalid client configuration: {0}")]
    InvalidClient(String),
}
