//! Domain types shared by the stores, the router and the gateway.

pub mod candle;
pub mod order;
pub mod position;
pub mod primitives;
pub mod quote;

pub use candle::Candle;
pub use order::OrderCommand;
pub use position::{Position, Ticket};
pub use primitives::{Price, Side, Timeframe, Volume};
pub use quote::Quote;
