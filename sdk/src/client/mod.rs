//! High-level client that keeps local state in sync with the bridge.
//!
//! # Example
//!
//! ```rust,ignore
//! use bridgesync_sdk::client::{SyncClient, SyncConfig};
//! use bridgesync_sdk::types::{OrderCommand, Timeframe};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (client, mut notifications) = SyncClient::start(SyncConfig::default())?;
//!     client.connect().await?;
//!
//!     // Switch the chart to hourly candles
//!     client.change_subscription("XAUUSDc", Timeframe::H1)?;
//!
//!     // Buy 0.1 lots and wait for the outcome
//!     client.place_order(&OrderCommand::buy("XAUUSDc", 0.1))?;
//!     if let Some(notification) = notifications.recv().await {
//!         println!("{}", notification);
//!     }
//!
//!     println!("Open P&L: {}", client.positions().total_pnl());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod session;

pub use config::SyncConfig;
pub use error::ClientError;
pub use session::SyncClient;
