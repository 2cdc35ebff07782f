//! Bridgesync SDK - client-side state synchronization for a trading bridge.
//!
//! This crate keeps a local copy of market data and open positions in sync
//! with a WebSocket bridge to a trading terminal, and sends trading commands
//! to it.
//!
//! # Components
//!
//! - [`ws::ConnectionManager`] — Socket lifecycle, keepalive and reconnection
//! - [`router::MessageRouter`] — Validates inbound frames and updates stores
//! - [`store::MarketDataStore`] — Candle series and latest quote
//! - [`store::PositionStore`] — Open positions and total P&L
//! - [`gateway::OrderGateway`] — Validated outbound commands
//! - [`client::SyncClient`] — Wires everything into one event loop
//!
//! # Core Types
//!
//! - [`Price`], [`Volume`] — Numeric wrappers
//! - [`Side`] — Order direction (BUY/SELL)
//! - [`Timeframe`] — Candle bucket size
//! - [`Candle`], [`Quote`], [`Position`] — Bridge payloads
//! - [`OrderCommand`] — Market order request
//!
//! # Example
//!
//! ```rust
//! use bridgesync_sdk::{OrderCommand, Side, Timeframe};
//!
//! let command = OrderCommand::new("XAUUSDc", Side::Buy, 0.1).with_stop_loss(2300.0);
//! assert!(command.validate().is_ok());
//!
//! assert_eq!("h1".parse::<Timeframe>(), Ok(Timeframe::H1));
//! ```

pub mod client;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod notification;
pub mod router;
pub mod store;
pub mod types;
pub mod ws;

pub use client::{ClientError, SyncClient, SyncConfig};
pub use error::SdkError;
pub use gateway::{Dispatch, OrderGateway};
pub use notification::{Notification, NotificationKind};
pub use store::{MarketSnapshot, PositionsSnapshot, Subscription};
pub use types::{Candle, OrderCommand, Position, Price, Quote, Side, Ticket, Timeframe, Volume};
pub use ws::ConnectionState;
