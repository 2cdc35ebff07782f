//! WebSocket transport to the trading bridge.
//!
//! This module owns the socket lifecycle, the wire message types and the
//! reconnect schedule. Higher layers only see parsed [`InboundFrame`]s and
//! send [`ClientMessage`]s through a [`ConnectionManager`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bridgesync_sdk::metrics::SyncMetrics;
//! use bridgesync_sdk::ws::{ClientMessage, ConnectionManager, InboundFrame, WsConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WsConfig::new("ws://localhost:8765");
//!     let (manager, mut inbound) = ConnectionManager::new(config, Arc::new(SyncMetrics::new()))?;
//!
//!     manager.connect().await?;
//!     manager.send(&ClientMessage::GetPositions);
//!
//!     while let Some(raw) = inbound.recv().await {
//!         println!("Received: {:?}", InboundFrame::parse(&raw));
//!     }
//!     Ok(())
//! }
//! ```

pub mod backoff;
pub mod config;
pub mod connection;
pub mod error;
pub mod messages;

pub use backoff::Backoff;
pub use config::{ReconnectPolicy, WsConfig};
pub use connection::{ConnectionManager, ConnectionState};
pub use error::WsError;
pub use messages::{
    ClientMessage, CommandResult, FrameError, InboundFrame, RequestId, ServerMessage,
};
