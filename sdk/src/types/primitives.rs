//! Primitive types for the bridge protocol.
//!
//! Provides wrappers for prices and volumes, order sides, and chart
//! timeframes as they appear on the wire.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SdkError;

/// An absolute price level as quoted by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    /// Creates a new price.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Returns true if the price is finite and strictly positive.
    #[must_use]
    pub fn is_valid_level(&self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<f64> for Price {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

/// A trade volume in lots.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volume(f64);

impl Volume {
    /// Creates a new volume.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Returns true if the volume can be traded (finite and > 0).
    #[must_use]
    pub fn is_tradable(&self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<f64> for Volume {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

/// Order / position side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Long.
    Buy,
    /// Short.
    Sell,
}

impl Side {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candle bucket size supported by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    /// 1 minute.
    M1,
    /// 5 minutes.
    M5,
    /// 15 minutes.
    #[default]
    M15,
    /// 30 minutes.
    M30,
    /// 1 hour.
    H1,
    /// 4 hours.
    H4,
    /// 1 day.
    D1,
}

impl Timeframe {
    /// All supported timeframes, shortest first.
    pub const ALL: [Self; 7] = [
        Self::M1,
        Self::M5,
        Self::M15,
        Self::M30,
        Self::H1,
        Self::H4,
        Self::D1,
    ];

    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::M1 => "M1",
            Self::M5 => "M5",
            Self::M15 => "M15",
            Self::M30 => "M30",
            Self::H1 => "H1",
            Self::H4 => "H4",
            Self::D1 => "D1",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|tf| tf.as_str() == upper)
            .ok_or_else(|| SdkError::InvalidTimeframe(s.to_string()))
    }
}

/// Validates a trading symbol.
///
/// # Errors
///
/// Returns `SdkError::InvalidSymbol` if the symbol is empty or contains
/// whitespace.
pub fn validate_symbol(symbol: &str) -> Result<(), SdkError> {
    if symbol.is_empty() || symbol.chars().any(char::is_whitespace) {
        return Err(SdkError::InvalidSymbol(symbol.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_valid_level() {
        assert!(Price::new(2350.5).is_valid_level());
        assert!(!Price::new(0.0).is_valid_level());
        assert!(!Price::new(-1.0).is_valid_level());
        assert!(!Price::new(f64::NAN).is_valid_level());
    }

    #[test]
    fn test_price_serde_transparent() {
        let json = serde_json::to_string(&Price::new(1.25)).expect("serialize");
        assert_eq!(json, "1.25");
        let price: Price = serde_json::from_str("2001.7").expect("deserialize");
        assert_eq!(price.value(), 2001.7);
    }

    #[test]
    fn test_volume_tradable() {
        assert!(Volume::new(0.01).is_tradable());
        assert!(!Volume::new(0.0).is_tradable());
        assert!(!Volume::new(f64::INFINITY).is_tradable());
    }

    #[test]
    fn test_side_wire_format() {
        assert_eq!(serde_json::to_string(&Side::Buy).expect("ser"), "\"BUY\"");
        let side: Side = serde_json::from_str("\"SELL\"").expect("de");
        assert_eq!(side, Side::Sell);
        assert_eq!(Side::Buy.to_string(), "BUY");
    }

    #[test]
    fn test_timeframe_wire_format() {
        assert_eq!(serde_json::to_string(&Timeframe::H1).expect("ser"), "\"H1\"");
        let tf: Timeframe = serde_json::from_str("\"D1\"").expect("de");
        assert_eq!(tf, Timeframe::D1);
    }

    #[test]
    fn test_timeframe_from_str() {
        assert_eq!("m15".parse::<Timeframe>().expect("parse"), Timeframe::M15);
        assert!("W1".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_timeframe_default() {
        assert_eq!(Timeframe::default(), Timeframe::M15);
        assert_eq!(Timeframe::default().to_string(), "M15");
    }

    #[test]
    fn test_validate_symbol() {
        assert!(validate_symbol("XAUUSDc").is_ok());
        assert!(validate_symbol("").is_err());
        assert!(validate_symbol("XAU USD").is_err());
    }
}
