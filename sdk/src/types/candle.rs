//! Candle (OHLC bar) type and series validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::primitives::Price;

/// One OHLC bar.
///
/// `time` is the bucket open time in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket open time (epoch milliseconds).
    pub time: i64,
    /// Open price.
    pub open: Price,
    /// High price.
    pub high: Price,
    /// Low price.
    pub low: Price,
    /// Close price.
    pub close: Price,
    /// Tick volume, when the bridge reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

impl Candle {
    /// Creates a candle without volume.
    #[must_use]
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open: Price::new(open),
            high: Price::new(high),
            low: Price::new(low),
            close: Price::new(close),
            volume: None,
        }
    }

    /// Returns the open time as a UTC timestamp.
    #[must_use]
    pub fn open_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.time)
    }
}

/// Checks that a series is strictly increasing by time.
///
/// Returns the index of the first offending candle, if any.
#[must_use]
pub fn first_out_of_order(series: &[Candle]) -> Option<usize> {
    series
        .windows(2)
        .position(|pair| match pair {
            [prev, next] => next.time <= prev.time,
            _ => false,
        })
        .map(|i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candle_deserialize_bridge_shape() {
        let json = r#"{"time":1717000000000,"open":2330.1,"high":2335.0,"low":2328.4,"close":2333.9,"volume":812}"#;
        let candle: Candle = serde_json::from_str(json).expect("deserialize");
        assert_eq!(candle.time, 1_717_000_000_000);
        assert_eq!(candle.close.value(), 2333.9);
        assert_eq!(candle.volume, Some(812));
    }

    #[test]
    fn test_candle_without_volume() {
        let json = r#"{"time":1,"open":1.0,"high":1.0,"low":1.0,"close":1.0}"#;
        let candle: Candle = serde_json::from_str(json).expect("deserialize");
        assert!(candle.volume.is_none());
    }

    #[test]
    fn test_candle_open_time() {
        let candle = Candle::new(1_717_000_000_000, 1.0, 1.0, 1.0, 1.0);
        let ts = candle.open_time().expect("timestamp");
        assert_eq!(ts.timestamp(), 1_717_000_000);
    }

    #[test]
    fn test_first_out_of_order() {
        let ordered = vec![
            Candle::new(1, 1.0, 1.0, 1.0, 1.0),
            Candle::new(2, 1.0, 1.0, 1.0, 1.0),
        ];
        assert_eq!(first_out_of_order(&ordered), None);
        assert_eq!(first_out_of_order(&[]), None);

        let duplicate = vec![
            Candle::new(1, 1.0, 1.0, 1.0, 1.0),
            Candle::new(2, 1.0, 1.0, 1.0, 1.0),
            Candle::new(2, 1.0, 1.0, 1.0, 1.0),
        ];
        assert_eq!(first_out_of_order(&duplicate), Some(2));
    }
}
