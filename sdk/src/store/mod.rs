//! State stores kept in sync with the bridge.
//!
//! Store contents are written only by the message router; everything else
//! reads through snapshots or `watch` receivers.

pub mod market;
pub mod positions;

pub use market::{MarketDataStore, MarketSnapshot, Subscription};
pub use positions::{PositionStore, PositionsSnapshot};
