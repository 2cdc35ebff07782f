//! Open position type.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::primitives::{Price, Side, Volume};

/// Broker-assigned position identifier.
pub type Ticket = u64;

/// An open trade as reported by the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Unique ticket.
    pub ticket: Ticket,
    /// Symbol.
    pub symbol: String,
    /// Direction (wire field `type`).
    #[serde(rename = "type")]
    pub side: Side,
    /// Volume in lots.
    pub volume: Volume,
    /// Entry price.
    pub price_open: Price,
    /// Current market price.
    pub price_current: Price,
    /// Floating profit in account currency.
    pub profit: f64,
    /// Stop loss level (the bridge reports 0 when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sl: Option<Price>,
    /// Take profit level (the bridge reports 0 when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tp: Option<Price>,
}

impl Position {
    /// Returns the stop loss if one is actually set.
    #[must_use]
    pub fn stop_loss(&self) -> Option<Price> {
        self.sl.filter(Price::is_valid_level)
    }

    /// Returns the take profit if one is actually set.
    #[must_use]
    pub fn take_profit(&self) -> Option<Price> {
        self.tp.filter(Price::is_valid_level)
    }
}

/// Returns the first ticket that appears more than once.
#[must_use]
pub fn first_duplicate_ticket(positions: &[Position]) -> Option<Ticket> {
    let mut seen = HashSet::with_capacity(positions.len());
    positions
        .iter()
        .map(|p| p.ticket)
        .find(|ticket| !seen.insert(*ticket))
}
