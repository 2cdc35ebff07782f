//! Outbound command gateway.
//!
//! Validates commands, tags them with request ids and hands them to the
//! connection. There is no timeout and no retry: a command either reaches
//! the socket or is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::error::SdkError;
use crate::types::primitives::validate_symbol;
use crate::types::{OrderCommand, Ticket, Timeframe};
use crate::ws::{ClientMessage, ConnectionManager, RequestId};

/// Default number of candles requested.
pub const DEFAULT_RATES_COUNT: u32 = 500;

/// Request kinds whose responses are checked for staleness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedRequest {
    /// `get_rates` / `rates`.
    Rates,
    /// `get_positions` / `positions`.
    Positions,
}

/// Allocates request ids and remembers the newest one sent per kind.
#[derive(Debug, Default)]
pub struct RequestTracker {
    next: AtomicU64,
    latest_rates: AtomicU64,
    latest_positions: AtomicU64,
}

impl RequestTracker {
    /// Creates a tracker. The first allocated id is 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&self) -> RequestId {
        self.next.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    fn slot(&self, kind: TrackedRequest) -> &AtomicU64 {
        match kind {
            TrackedRequest::Rates => &self.latest_rates,
            TrackedRequest::Positions => &self.latest_positions,
        }
    }

    fn mark_sent(&self, kind: TrackedRequest, id: RequestId) {
        self.slot(kind).fetch_max(id, Ordering::SeqCst);
    }

    /// Returns the newest id successfully sent for `kind`.
    #[must_use]
    pub fn latest(&self, kind: TrackedRequest) -> Option<RequestId> {
        match self.slot(kind).load(Ordering::SeqCst) {
            0 => None,
            id => Some(id),
        }
    }

    /// Returns false if `id` answers a request older than the newest one
    /// sent for `kind`.
    #[must_use]
    pub fn is_current(&self, kind: TrackedRequest, id: RequestId) -> bool {
        self.latest(kind).map_or(true, |latest| id >= latest)
    }
}

/// What happened to a command after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Handed to the socket, with the request id it was tagged with.
    Sent(Option<RequestId>),
    /// Not connected; nothing was sent.
    Dropped,
}

impl Dispatch {
    /// Returns true if the command reached the socket.
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent(_))
    }
}

/// Sends trading and data commands to the bridge.
#[derive(Debug, Clone)]
pub struct OrderGateway {
    connection: ConnectionManager,
    tracker: Arc<RequestTracker>,
}

impl OrderGateway {
    /// Creates a gateway over a connection.
    #[must_use]
    pub fn new(connection: ConnectionManager, tracker: Arc<RequestTracker>) -> Self {
        Self {
            connection,
            tracker,
        }
    }

    /// Returns the request tracker.
    #[must_use]
    pub fn tracker(&self) -> &Arc<RequestTracker> {
        &self.tracker
    }

    /// Requests the last `count` candles of `symbol` at `timeframe`.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol is empty or `count` is zero.
    pub fn get_rates(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: u32,
    ) -> Result<Dispatch, SdkError> {
        validate_symbol(symbol)?;
        if count == 0 {
            return Err(SdkError::InvalidCount(count));
        }

        Ok(self.dispatch(
            &ClientMessage::GetRates {
                symbol: symbol.to_string(),
                timeframe,
                count,
            },
            Some(TrackedRequest::Rates),
        ))
    }

    /// Requests a single tick for `symbol`.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol is empty.
    pub fn get_tick(&self, symbol: &str) -> Result<Dispatch, SdkError> {
        validate_symbol(symbol)?;
        Ok(self.dispatch(
            &ClientMessage::GetTick {
                symbol: symbol.to_string(),
            },
            None,
        ))
    }

    /// Requests the open positions snapshot.
    pub fn get_positions(&self) -> Dispatch {
        self.dispatch(&ClientMessage::GetPositions, Some(TrackedRequest::Positions))
    }

    /// Places a market order.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails validation; nothing is sent.
    pub fn place_order(&self, command: &OrderCommand) -> Result<Dispatch, SdkError> {
        command.validate()?;
        Ok(self.dispatch(
            &ClientMessage::PlaceOrder {
                symbol: command.symbol.clone(),
                order_type: command.side,
                volume: command.volume,
                sl: command.stop_loss,
                tp: command.take_profit,
            },
            None,
        ))
    }

    /// Closes the position with `ticket`.
    pub fn close_position(&self, ticket: Ticket) -> Dispatch {
        self.dispatch(&ClientMessage::ClosePosition { ticket }, None)
    }

    fn dispatch(&self, message: &ClientMessage, tracked: Option<TrackedRequest>) -> Dispatch {
        let request_id = self
            .connection
            .config()
            .request_ids
            .then(|| self.tracker.allocate());

        if !self.connection.send_tagged(message, request_id) {
            return Dispatch::Dropped;
        }

        if let (Some(kind), Some(id)) = (tracked, request_id) {
            self.tracker.mark_sent(kind, id);
            debug!(?kind, id, "tracking request");
        }

        Dispatch::Sent(request_id)
    }
}
