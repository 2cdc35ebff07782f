//! Market data store.
//!
//! Holds the candle series of the active subscription and the latest quote.
//! Both are replaced wholesale; a quote never touches the series. Readers
//! get a `watch` receiver and re-render on change.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use crate::types::{Candle, Quote, Timeframe};

/// The (symbol, timeframe) pair whose series is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    /// Symbol.
    pub symbol: String,
    /// Candle bucket size.
    pub timeframe: Timeframe,
}

impl Subscription {
    /// Creates a subscription.
    #[must_use]
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
        }
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.symbol, self.timeframe)
    }
}

/// Read-only view of the market data store.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    /// Tracked subscription.
    pub subscription: Subscription,
    /// Candle series; may still belong to the previous subscription until
    /// the new `rates` frame arrives.
    pub series: Arc<[Candle]>,
    /// Latest quote.
    pub quote: Option<Quote>,
}

impl MarketSnapshot {
    /// Returns the most recent candle.
    #[must_use]
    pub fn last_candle(&self) -> Option<&Candle> {
        self.series.last()
    }

    /// Returns true if no series has arrived yet (or the bridge had none).
    #[must_use]
    pub fn has_series(&self) -> bool {
        !self.series.is_empty()
    }
}

/// Store for the active price series and quote.
#[derive(Debug)]
pub struct MarketDataStore {
    state: watch::Sender<MarketSnapshot>,
}

impl MarketDataStore {
    /// Creates an empty store tracking `subscription`.
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        let (state, _) = watch::channel(MarketSnapshot {
            subscription,
            series: Arc::from(Vec::new()),
            quote: None,
        });
        Self { state }
    }

    /// Returns a receiver notified on every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<MarketSnapshot> {
        self.state.subscribe()
    }

    /// Returns the current contents.
    #[must_use]
    pub fn snapshot(&self) -> MarketSnapshot {
        self.state.borrow().clone()
    }

    /// Returns the tracked subscription.
    #[must_use]
    pub fn subscription(&self) -> Subscription {
        self.state.borrow().subscription.clone()
    }

    /// Returns the current series.
    #[must_use]
    pub fn series(&self) -> Arc<[Candle]> {
        Arc::clone(&self.state.borrow().series)
    }

    /// Returns the latest quote.
    #[must_use]
    pub fn quote(&self) -> Option<Quote> {
        self.state.borrow().quote.clone()
    }

    /// Replaces the series.
    pub(crate) fn set_series(&self, candles: Vec<Candle>) {
        self.state.send_modify(|snapshot| {
            snapshot.series = Arc::from(candles);
        });
    }

    /// Replaces the quote.
    pub(crate) fn set_quote(&self, quote: Quote) {
        self.state.send_modify(|snapshot| {
            snapshot.quote = Some(quote);
        });
    }

    /// Switches the tracked pair. Series and quote are left in place.
    ///
    /// Returns true if the pair actually changed.
    pub(crate) fn change_subscription(&self, subscription: Subscription) -> bool {
        self.state.send_if_modified(|snapshot| {
            if snapshot.subscription == subscription {
                false
            } else {
                snapshot.subscription = subscription;
                true
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MarketDataStore {
        MarketDataStore::new(Subscription::new("XAUUSD", Timeframe::M15))
    }

    fn candles(times: &[i64]) -> Vec<Candle> {
        times
            .iter()
            .map(|&t| Candle::new(t, 1.0, 2.0, 0.5, 1.5))
            .collect()
    }

    #[test]
    fn test_store_starts_empty() {
        let store = store();
        let snapshot = store.snapshot();
        assert!(!snapshot.has_series());
        assert!(snapshot.quote.is_none());
        assert_eq!(snapshot.subscription.to_string(), "XAUUSD@M15");
    }

    #[test]
    fn test_set_series_replaces_wholesale() {
        let store = store();
        store.set_series(candles(&[1, 2, 3]));
        store.set_series(candles(&[10, 20]));

        assert_eq!(&*store.series(), candles(&[10, 20]).as_slice());
        assert_eq!(store.snapshot().last_candle().map(|c| c.time), Some(20));
    }

    #[test]
    fn test_set_empty_series() {
        let store = store();
        store.set_series(candles(&[1]));
        store.set_series(Vec::new());
        assert!(!store.snapshot().has_series());
    }

    #[test]
    fn test_quote_does_not_touch_series() {
        let store = store();
        store.set_series(candles(&[1, 2]));
        let before = store.series();

        for i in 0..5 {
            store.set_quote(Quote::new(100.0 + f64::from(i), 100.5 + f64::from(i)));
        }

        assert!(Arc::ptr_eq(&before, &store.series()));
        assert_eq!(store.quote().map(|q| q.bid.value()), Some(104.0));
    }

    #[test]
    fn test_change_subscription_keeps_series() {
        let store = store();
        store.set_series(candles(&[1, 2]));
        store.set_quote(Quote::new(1.0, 2.0));

        assert!(store.change_subscription(Subscription::new("XAUUSD", Timeframe::H1)));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.subscription.timeframe, Timeframe::H1);
        assert_eq!(snapshot.series.len(), 2);
        assert!(snapshot.quote.is_some());
    }

    #[test]
    fn test_change_subscription_same_pair() {
        let store = store();
        assert!(!store.change_subscription(Subscription::new("XAUUSD", Timeframe::M15)));
    }

    #[tokio::test]
    async fn test_subscribers_notified() {
        let store = store();
        let mut rx = store.subscribe();

        store.set_series(candles(&[5]));

        rx.changed().await.expect("changed");
        assert_eq!(rx.borrow().series.len(), 1);
    }
}
