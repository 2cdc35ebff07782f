//! Sync client: wires the connection, router, stores and gateway together.
//!
//! One background task owns the [`MessageRouter`]. It consumes inbound
//! frames strictly in order and, when enabled, re-requests the current
//! series and positions every time the connection reaches Connected.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::gateway::{Dispatch, OrderGateway, RequestTracker};
use crate::metrics::{SyncMetrics, SyncMetricsSnapshot};
use crate::notification::{self, NotificationReceiver};
use crate::router::MessageRouter;
use crate::store::{
    MarketDataStore, MarketSnapshot, PositionStore, PositionsSnapshot, Subscription,
};
use crate::types::primitives::validate_symbol;
use crate::types::{OrderCommand, Ticket, Timeframe};
use crate::ws::{ConnectionManager, ConnectionState};

use super::config::SyncConfig;
use super::error::ClientError;

/// Keeps the local stores in sync with the bridge.
#[derive(Debug)]
pub struct SyncClient {
    connection: ConnectionManager,
    gateway: OrderGateway,
    market: Arc<MarketDataStore>,
    positions: Arc<PositionStore>,
    metrics: Arc<SyncMetrics>,
    rates_count: u32,
    task: JoinHandle<()>,
}

impl SyncClient {
    /// Builds the client and starts its event loop.
    ///
    /// Must be called inside a tokio runtime. The socket is not opened until
    /// [`SyncClient::connect`] is called. Command outcomes are delivered on
    /// the returned receiver.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn start(config: SyncConfig) -> Result<(Self, NotificationReceiver), ClientError> {
        config.validate()?;

        let metrics = Arc::new(SyncMetrics::new());
        let (connection, inbound) = ConnectionManager::new(config.ws, Arc::clone(&metrics))?;
        let gateway = OrderGateway::new(connection.clone(), Arc::new(RequestTracker::new()));
        let market = Arc::new(MarketDataStore::new(config.subscription));
        let positions = Arc::new(PositionStore::new());
        let (notifications_tx, notifications_rx) = notification::channel();

        let router = MessageRouter::new(
            Arc::clone(&market),
            Arc::clone(&positions),
            gateway.clone(),
            notifications_tx,
            Arc::clone(&metrics),
        );

        let resync = config.resync_on_connect.then(|| Resync {
            market: Arc::clone(&market),
            gateway: gateway.clone(),
            rates_count: config.rates_count,
        });

        let task = tokio::spawn(run(router, inbound, connection.state(), resync));

        let client = Self {
            connection,
            gateway,
            market,
            positions,
            metrics,
            rates_count: config.rates_count,
            task,
        };

        Ok((client, notifications_rx))
    }

    /// Opens the connection to the bridge.
    ///
    /// # Errors
    ///
    /// Returns an error if the first connection attempt fails.
    pub async fn connect(&self) -> Result<(), ClientError> {
        self.connection.connect().await?;
        Ok(())
    }

    /// Closes the connection and cancels any pending reconnection.
    pub fn close(&self) {
        self.connection.close();
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.current_state()
    }

    /// Returns an observer for connection state changes.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.connection.state()
    }

    /// Returns an observer for the market data store.
    #[must_use]
    pub fn watch_market(&self) -> watch::Receiver<MarketSnapshot> {
        self.market.subscribe()
    }

    /// Returns an observer for the positions store.
    #[must_use]
    pub fn watch_positions(&self) -> watch::Receiver<PositionsSnapshot> {
        self.positions.subscribe()
    }

    /// Returns the current market data.
    #[must_use]
    pub fn market(&self) -> MarketSnapshot {
        self.market.snapshot()
    }

    /// Returns the current open positions.
    #[must_use]
    pub fn positions(&self) -> PositionsSnapshot {
        self.positions.snapshot()
    }

    /// Returns the command gateway.
    #[must_use]
    pub fn gateway(&self) -> &OrderGateway {
        &self.gateway
    }

    /// Returns a metrics snapshot.
    #[must_use]
    pub fn metrics(&self) -> SyncMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Switches the tracked subscription and requests its series.
    ///
    /// The previous series and quote stay visible until the new `rates`
    /// frame arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol is empty.
    pub fn change_subscription(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Dispatch, ClientError> {
        validate_symbol(symbol)?;

        if self
            .market
            .change_subscription(Subscription::new(symbol, timeframe))
        {
            info!(symbol, %timeframe, "subscription changed");
        }

        Ok(self.gateway.get_rates(symbol, timeframe, self.rates_count)?)
    }

    /// Places a market order.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails validation.
    pub fn place_order(&self, command: &OrderCommand) -> Result<Dispatch, ClientError> {
        Ok(self.gateway.place_order(command)?)
    }

    /// Closes a position.
    pub fn close_position(&self, ticket: Ticket) -> Dispatch {
        self.gateway.close_position(ticket)
    }

    /// Requests a quote for the tracked symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracked symbol is invalid.
    pub fn refresh_quote(&self) -> Result<Dispatch, ClientError> {
        Ok(self.gateway.get_tick(&self.market.subscription().symbol)?)
    }

    /// Requests the open positions.
    pub fn refresh_positions(&self) -> Dispatch {
        self.gateway.get_positions()
    }
}

impl Drop for SyncClient {
    fn drop(&mut self) {
        self.connection.close();
        self.task.abort();
    }
}

/// Requests issued whenever the connection comes up.
#[derive(Debug)]
struct Resync {
    market: Arc<MarketDataStore>,
    gateway: OrderGateway,
    rates_count: u32,
}

impl Resync {
    fn run(&self) {
        let subscription = self.market.subscription();
        info!(%subscription, "resyncing after connect");

        if let Err(e) =
            self.gateway
                .get_rates(&subscription.symbol, subscription.timeframe, self.rates_count)
        {
            warn!(error = %e, "resync rates request rejected");
        }
        self.gateway.get_positions();
    }
}

async fn run(
    router: MessageRouter,
    mut inbound: mpsc::Receiver<String>,
    mut state: watch::Receiver<ConnectionState>,
    resync: Option<Resync>,
) {
    loop {
        tokio::select! {
            raw = inbound.recv() => match raw {
                Some(raw) => {
                    // Rejections are logged and counted by the router.
                    let _ = router.handle(&raw);
                }
                None => break,
            },
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *state.borrow_and_update();
                debug!(state = %current, "connection state observed");
                if current.is_connected() {
                    if let Some(resync) = &resync {
                        resync.run();
                    }
                }
            }
        }
    }
    debug!("sync event loop stopped");
}
