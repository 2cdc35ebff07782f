//! User-facing notifications for command outcomes.
//!
//! The router pushes one [`Notification`] per `order_result` or
//! `close_result` frame onto an unbounded channel, so routing never waits
//! on the presentation layer.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::ws::CommandResult;

/// Receiving half of the notification queue.
pub type NotificationReceiver = mpsc::UnboundedReceiver<Notification>;

/// Sending half of the notification queue.
pub type NotificationSender = mpsc::UnboundedSender<Notification>;

/// Creates a notification queue.
#[must_use]
pub fn channel() -> (NotificationSender, NotificationReceiver) {
    mpsc::unbounded_channel()
}

/// Kind of command outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// An order was executed.
    OrderPlaced,
    /// The bridge refused an order.
    OrderRejected,
    /// A position was closed.
    PositionClosed,
    /// The bridge refused to close a position.
    CloseRejected,
}

impl NotificationKind {
    /// Returns true for the rejection kinds.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::OrderRejected | Self::CloseRejected)
    }
}

/// A command outcome to show to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Outcome kind.
    pub kind: NotificationKind,
    /// Human-readable text; failures carry the bridge error verbatim.
    pub message: String,
    /// When the outcome was received.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates a notification stamped now.
    #[must_use]
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    /// Builds the notification for an `order_result` payload.
    #[must_use]
    pub fn order_result(result: &CommandResult) -> Self {
        if !result.success {
            return Self::new(
                NotificationKind::OrderRejected,
                format!("Order rejected: {}", failure_reason(result)),
            );
        }

        let mut message = String::from("Order placed");
        if let Some(ticket) = result.ticket {
            message.push_str(&format!(": ticket {}", ticket));
        }
        if let (Some(volume), Some(price)) = (result.volume, result.price) {
            message.push_str(&format!(", {} lots @ {}", volume, price));
        }
        Self::new(NotificationKind::OrderPlaced, message)
    }

    /// Builds the notification for a `close_result` payload.
    #[must_use]
    pub fn close_result(result: &CommandResult) -> Self {
        if !result.success {
            return Self::new(
                NotificationKind::CloseRejected,
                format!("Close rejected: {}", failure_reason(result)),
            );
        }

        let message = match result.ticket {
            Some(ticket) => format!("Position {} closed", ticket),
            None => "Position closed".to_string(),
        };
        Self::new(NotificationKind::PositionClosed, message)
    }

    /// Returns true if this reports a rejected command.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.kind.is_failure()
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn failure_reason(result: &CommandResult) -> &str {
    result.error.as_deref().unwrap_or("unknown error")
}
