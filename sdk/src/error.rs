//! SDK error types.
//!
//! Errors raised while validating commands before they are sent.

/// SDK errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SdkError {
    /// Symbol is empty or contains whitespace.
    #[error("invalid symbol: {0:?}")]
    InvalidSymbol(String),

    /// Volume is not a positive finite number.
    #[error("invalid volume: {0}")]
    InvalidVolume(f64),

    /// Price level is not a positive finite number.
    #[error("invalid price for {field}: {value}")]
    InvalidPrice {
        /// Which price field was rejected (`sl` or `tp`).
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Candle count must be greater than zero.
    #[error("invalid candle count: {0}")]
    InvalidCount(u32),

    /// Unknown timeframe label.
    #[error("invalid timeframe: {0}")]
    InvalidTimeframe(String),

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SdkError::InvalidVolume(-1.0);
        assert_eq!(err.to_string(), "invalid volume: -1");
    }

    #[test]
    fn test_error_invalid_price() {
        let err = SdkError::InvalidPrice {
            field: "sl",
            value: 0.0,
        };
        assert_eq!(err.to_string(), "invalid price for sl: 0");
    }

    #[test]
    fn test_error_invalid_symbol() {
        let err = SdkError::InvalidSymbol(String::new());
        assert_eq!(err.to_string(), "invalid symbol: \"\"");
    }
}
