//! Inbound frame routing.
//!
//! [`MessageRouter`] is the only writer of store contents. It handles one
//! frame at a time: parse, validate, drop if stale, then apply as a full
//! replacement. Bad frames are logged and counted; they never reach a store.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::gateway::{OrderGateway, TrackedRequest};
use crate::metrics::SyncMetrics;
use crate::notification::{Notification, NotificationSender};
use crate::store::{MarketDataStore, PositionStore};
use crate::ws::{FrameError, InboundFrame, RequestId, ServerMessage};

/// What the router did with a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Series replaced.
    Rates {
        /// Number of candles in the new series.
        candles: usize,
    },
    /// Quote replaced.
    Quote,
    /// Tick frame with no data; quote kept.
    QuoteMissing,
    /// Positions replaced.
    Positions {
        /// Number of open positions.
        count: usize,
    },
    /// Order outcome notified.
    OrderResult {
        /// Whether the order was executed.
        success: bool,
    },
    /// Close outcome notified.
    CloseResult {
        /// Whether the position was closed.
        success: bool,
    },
    /// Unrecognized frame type.
    Ignored(String),
    /// Response to a superseded request.
    Stale {
        /// The echoed request id.
        request_id: RequestId,
    },
}

/// Applies inbound frames to the stores.
#[derive(Debug)]
pub struct MessageRouter {
    market: Arc<MarketDataStore>,
    positions: Arc<PositionStore>,
    gateway: OrderGateway,
    notifications: NotificationSender,
    metrics: Arc<SyncMetrics>,
}

impl MessageRouter {
    /// Creates a router writing to the given stores.
    #[must_use]
    pub fn new(
        market: Arc<MarketDataStore>,
        positions: Arc<PositionStore>,
        gateway: OrderGateway,
        notifications: NotificationSender,
        metrics: Arc<SyncMetrics>,
    ) -> Self {
        Self {
            market,
            positions,
            gateway,
            notifications,
            metrics,
        }
    }

    /// Parses and applies one raw text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is malformed or its payload is invalid.
    /// The stores are untouched in that case.
    pub fn handle(&self, raw: &str) -> Result<RouteOutcome, FrameError> {
        self.metrics.record_received();

        let frame = match InboundFrame::parse(raw) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "rejected inbound frame");
                self.metrics.record_rejected();
                return Err(e);
            }
        };

        Ok(self.route(frame))
    }

    /// Applies an already parsed frame.
    pub fn route(&self, frame: InboundFrame) -> RouteOutcome {
        let InboundFrame {
            message,
            request_id,
        } = frame;

        if let Some(id) = request_id {
            if let Some(kind) = tracked_kind(&message) {
                if !self.gateway.tracker().is_current(kind, id) {
                    debug!(kind = message.kind(), request_id = id, "dropping stale response");
                    self.metrics.record_stale();
                    return RouteOutcome::Stale { request_id: id };
                }
            }
        }

        let outcome = match message {
            ServerMessage::Rates(series) => {
                let candles = series.len();
                self.market.set_series(series);
                debug!(candles, "series replaced");
                RouteOutcome::Rates { candles }
            }
            ServerMessage::Tick(Some(quote)) => {
                self.market.set_quote(quote);
                RouteOutcome::Quote
            }
            ServerMessage::Tick(None) => {
                debug!("tick without data");
                RouteOutcome::QuoteMissing
            }
            ServerMessage::Positions(positions) => {
                let count = positions.len();
                self.positions.replace(positions);
                debug!(count, total_pnl = self.positions.total_pnl(), "positions replaced");
                RouteOutcome::Positions { count }
            }
            ServerMessage::OrderResult(result) => {
                self.notify(Notification::order_result(&result));
                if result.success {
                    self.refresh_positions();
                }
                RouteOutcome::OrderResult {
                    success: result.success,
                }
            }
            ServerMessage::CloseResult(result) => {
                self.notify(Notification::close_result(&result));
                if result.success {
                    self.refresh_positions();
                }
                RouteOutcome::CloseResult {
                    success: result.success,
                }
            }
            ServerMessage::Unknown(kind) => {
                debug!(%kind, "ignoring frame");
                self.metrics.record_ignored();
                return RouteOutcome::Ignored(kind);
            }
        };

        self.metrics.record_routed();
        outcome
    }

    fn notify(&self, notification: Notification) {
        if notification.is_failure() {
            warn!(message = %notification, "command rejected by bridge");
        } else {
            info!(message = %notification, "command executed");
        }
        if self.notifications.send(notification).is_err() {
            debug!("notification receiver dropped");
        }
    }

    fn refresh_positions(&self) {
        if !self.gateway.get_positions().is_sent() {
            debug!("positions refresh dropped");
        }
    }
}

fn tracked_kind(message: &ServerMessage) -> Option<TrackedRequest> {
    match message {
        ServerMessage::Rates(_) => Some(TrackedRequest::Rates),
        ServerMessage::Positions(_) => Some(TrackedRequest::Positions),
        _ => None,
    }
}
