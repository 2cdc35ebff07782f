//! Order command parameters.
//!
//! An [`OrderCommand`] is built by the presentation, validated, turned into a
//! `place_order` frame and then discarded. No record of in-flight orders is
//! kept.

use serde::{Deserialize, Serialize};

use super::primitives::{validate_symbol, Price, Side, Volume};
use crate::error::SdkError;

/// A market order to open a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCommand {
    /// Symbol to trade.
    pub symbol: String,
    /// Direction.
    pub side: Side,
    /// Volume in lots.
    pub volume: Volume,
    /// Absolute stop loss level.
    pub stop_loss: Option<Price>,
    /// Absolute take profit level.
    pub take_profit: Option<Price>,
}

impl OrderCommand {
    /// Creates a new order without protective levels.
    #[must_use]
    pub fn new(symbol: impl Into<String>, side: Side, volume: f64) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            volume: Volume::new(volume),
            stop_loss: None,
            take_profit: None,
        }
    }

    /// Creates a buy order.
    #[must_use]
    pub fn buy(symbol: impl Into<String>, volume: f64) -> Self {
        Self::new(symbol, Side::Buy, volume)
    }

    /// Creates a sell order.
    #[must_use]
    pub fn sell(symbol: impl Into<String>, volume: f64) -> Self {
        Self::new(symbol, Side::Sell, volume)
    }

    /// Sets the stop loss price level.
    #[must_use]
    pub fn with_stop_loss(mut self, price: f64) -> Self {
        self.stop_loss = Some(Price::new(price));
        self
    }

    /// Sets the take profit price level.
    #[must_use]
    pub fn with_take_profit(mut self, price: f64) -> Self {
        self.take_profit = Some(Price::new(price));
        self
    }

    /// Validates the order before it is sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol is empty, the volume is not a positive
    /// finite number, or a protective level is not a positive finite price.
    pub fn validate(&self) -> Result<(), SdkError> {
        validate_symbol(&self.symbol)?;

        if !self.volume.is_tradable() {
            return Err(SdkError::InvalidVolume(self.volume.value()));
        }

        if let Some(sl) = self.stop_loss.filter(|p| !p.is_valid_level()) {
            return Err(SdkError::InvalidPrice {
                field: "sl",
                value: sl.value(),
            });
        }

        if let Some(tp) = self.take_profit.filter(|p| !p.is_valid_level()) {
            return Err(SdkError::InvalidPrice {
                field: "tp",
                value: tp.value(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_builder() {
        let order = OrderCommand::buy("XAUUSDc", 0.01)
            .with_stop_loss(2300.0)
            .with_take_profit(2400.0);

        assert_eq!(order.side, Side::Buy);
        assert_eq!(order.volume, Volume::new(0.01));
        assert_eq!(order.stop_loss, Some(Price::new(2300.0)));
        assert_eq!(order.take_profit, Some(Price::new(2400.0)));
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_order_validate_volume() {
        assert_eq!(
            OrderCommand::sell("XAUUSDc", 0.0).validate(),
            Err(SdkError::InvalidVolume(0.0))
        );
        assert!(OrderCommand::sell("XAUUSDc", -0.5).validate().is_err());
        assert!(OrderCommand::sell("XAUUSDc", f64::NAN).validate().is_err());
    }

    #[test]
    fn test_order_validate_levels() {
        let order = OrderCommand::buy("XAUUSDc", 0.1).with_stop_loss(-1.0);
        assert!(matches!(
            order.validate(),
            Err(SdkError::InvalidPrice { field: "sl", .. })
        ));

        let order = OrderCommand::buy("XAUUSDc", 0.1).with_take_profit(f64::INFINITY);
        assert!(matches!(
            order.validate(),
            Err(SdkError::InvalidPrice { field: "tp", .. })
        ));
    }

    #[test]
    fn test_order_validate_symbol() {
        assert!(OrderCommand::buy("", 0.1).validate().is_err());
    }
}
