//! Live quote (tick) type.

use serde::{Deserialize, Serialize};

use super::primitives::Price;

/// The latest bid/ask pair for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Symbol, when the frame carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Best bid.
    pub bid: Price,
    /// Best ask.
    pub ask: Price,
    /// Tick time (epoch milliseconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    /// Last traded price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<Price>,
    /// Tick volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

impl Quote {
    /// Creates a bare bid/ask quote.
    #[must_use]
    pub fn new(bid: f64, ask: f64) -> Self {
        Self {
            symbol: None,
            bid: Price::new(bid),
            ask: Price::new(ask),
            time: None,
            last: None,
            volume: None,
        }
    }

    /// Attaches a symbol.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Returns the ask minus the bid.
    #[must_use]
    pub fn spread(&self) -> f64 {
        self.ask.value() - self.bid.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_deserialize_bridge_shape() {
        let json = r#"{"time":1717000000000,"bid":2331.2,"ask":2331.5,"last":0.0,"volume":0}"#;
        let quote: Quote = serde_json::from_str(json).expect("deserialize");
        assert_eq!(quote.bid.value(), 2331.2);
        assert_eq!(quote.ask.value(), 2331.5);
        assert!(quote.symbol.is_none());
        assert_eq!(quote.time, Some(1_717_000_000_000));
    }

    #[test]
    fn test_quote_minimal() {
        let quote: Quote = serde_json::from_str(r#"{"bid":1.0,"ask":1.5}"#).expect("deserialize");
        assert!((quote.spread() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_quote_missing_ask_rejected() {
        assert!(serde_json::from_str::<Quote>(r#"{"bid":1.0}"#).is_err());
    }
}
