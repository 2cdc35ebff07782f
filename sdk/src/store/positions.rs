//! Open positions store.

use std::sync::Arc;

use tokio::sync::watch;

use crate::types::{Position, Ticket};

/// Read-only view of the open positions.
#[derive(Debug, Clone)]
pub struct PositionsSnapshot {
    positions: Arc<[Position]>,
}

impl Default for PositionsSnapshot {
    fn default() -> Self {
        Self {
            positions: Arc::from(Vec::new()),
        }
    }
}

impl PositionsSnapshot {
    /// Returns all positions in bridge order.
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Returns the sum of floating profit across all positions.
    #[must_use]
    pub fn total_pnl(&self) -> f64 {
        self.positions.iter().map(|p| p.profit).sum()
    }

    /// Looks up a position by ticket.
    #[must_use]
    pub fn get(&self, ticket: Ticket) -> Option<&Position> {
        self.positions.iter().find(|p| p.ticket == ticket)
    }

    /// Returns the number of open positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if there are no open positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Store for the latest open positions snapshot.
#[derive(Debug)]
pub struct PositionStore {
    state: watch::Sender<PositionsSnapshot>,
}

impl Default for PositionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(PositionsSnapshot::default());
        Self { state }
    }

    /// Returns a receiver notified on every replacement.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PositionsSnapshot> {
        self.state.subscribe()
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> PositionsSnapshot {
        self.state.borrow().clone()
    }

    /// Returns the current total P&L.
    #[must_use]
    pub fn total_pnl(&self) -> f64 {
        self.state.borrow().total_pnl()
    }

    /// Replaces the whole collection.
    pub(crate) fn replace(&self, positions: Vec<Position>) {
        self.state.send_modify(|snapshot| {
            snapshot.positions = Arc::from(positions);
        });
    }
}
