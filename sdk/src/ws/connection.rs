//! Bridge connection lifecycle.
//!
//! [`ConnectionManager`] owns the WebSocket, exposes a fire-and-forget
//! [`ConnectionManager::send`] and publishes its [`ConnectionState`] through a
//! `watch` channel. Inbound text frames are forwarded, in arrival order, to
//! the receiver returned by [`ConnectionManager::new`].
//!
//! Every attached socket gets a new epoch. `close()` also bumps the epoch, so
//! a socket task or reconnect loop that finds the epoch moved on knows it has
//! been superseded and exits without touching the shared state.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch, Notify};
use tokio::time::Interval;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::backoff::Backoff;
use super::config::WsConfig;
use super::error::WsError;
use super::messages::{ClientMessage, RequestId};
use crate::metrics::SyncMetrics;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type OutboundSlot = Option<mpsc::UnboundedSender<Outbound>>;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// No socket.
    #[default]
    Disconnected,
    /// Opening a socket after `connect()`.
    Connecting,
    /// Socket open; commands are delivered.
    Connected,
    /// Socket lost; waiting to retry.
    Reconnecting,
}

impl ConnectionState {
    /// Returns true if commands can be sent.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Reconnecting => write!(f, "reconnecting"),
        }
    }
}

#[derive(Debug)]
pub(crate) enum Outbound {
    Text(String),
    Close,
}

/// Owns the bridge socket.
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: WsConfig,
    state: watch::Sender<ConnectionState>,
    outbound: Mutex<OutboundSlot>,
    inbound: mpsc::Sender<String>,
    epoch: AtomicU64,
    shutdown: Notify,
    metrics: Arc<SyncMetrics>,
}

impl ConnectionManager {
    /// Creates a manager and the receiver for inbound text frames.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(
        config: WsConfig,
        metrics: Arc<SyncMetrics>,
    ) -> Result<(Self, mpsc::Receiver<String>), WsError> {
        config.validate()?;

        let (inbound_tx, inbound_rx) = mpsc::channel(config.inbound_capacity);
        let (state, _) = watch::channel(ConnectionState::Disconnected);

        let manager = Self {
            inner: Arc::new(Inner {
                config,
                state,
                outbound: Mutex::new(None),
                inbound: inbound_tx,
                epoch: AtomicU64::new(0),
                shutdown: Notify::new(),
                metrics,
            }),
        };

        Ok((manager, inbound_rx))
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &WsConfig {
        &self.inner.config
    }

    /// Returns the current state.
    #[must_use]
    pub fn current_state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Returns an observer that is notified on every state change.
    #[must_use]
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Returns true if connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.current_state().is_connected()
    }

    /// Opens the socket.
    ///
    /// Does nothing if a socket is already open, opening, or being
    /// re-established.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be opened, or if `close()` was
    /// called while it was opening.
    pub async fn connect(&self) -> Result<(), WsError> {
        // Claim and epoch read share the state lock; a later `close()`
        // invalidates the token.
        let mut token = None;
        self.inner.state.send_if_modified(|state| {
            if *state != ConnectionState::Disconnected {
                return false;
            }
            *state = ConnectionState::Connecting;
            token = Some(self.inner.epoch.load(Ordering::SeqCst));
            true
        });
        let Some(token) = token else {
            debug!(state = %self.current_state(), "connect ignored");
            return Ok(());
        };

        info!(url = %self.inner.config.url, "connecting to bridge");

        let stream = match self.inner.open().await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "bridge connection failed");
                self.inner.settle(token, ConnectionState::Disconnected);
                return Err(e);
            }
        };

        let (epoch, outbound_rx) = self.inner.attach(token).ok_or(WsError::Closed)?;
        tokio::spawn(Arc::clone(&self.inner).supervise(stream, epoch, outbound_rx));

        Ok(())
    }

    /// Sends a command without a request id.
    ///
    /// Returns true if the frame was handed to the socket. While not
    /// connected the command is dropped.
    pub fn send(&self, message: &ClientMessage) -> bool {
        self.send_tagged(message, None)
    }

    /// Sends a command, appending `request_id` when given.
    ///
    /// Returns true if the frame was handed to the socket. While not
    /// connected the command is dropped; it is never queued or retried.
    pub fn send_tagged(&self, message: &ClientMessage, request_id: Option<RequestId>) -> bool {
        let action = message.action();

        if !self.is_connected() {
            debug!(action, "not connected, command dropped");
            self.inner.metrics.record_dropped();
            return false;
        }

        let frame = match message.to_frame(request_id) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(action, error = %e, "failed to serialize command");
                self.inner.metrics.record_dropped();
                return false;
            }
        };

        let handed_off = self
            .inner
            .outbound_slot()
            .as_ref()
            .is_some_and(|tx| tx.send(Outbound::Text(frame)).is_ok());

        if handed_off {
            debug!(action, ?request_id, "command sent");
            self.inner.metrics.record_sent();
        } else {
            debug!(action, "socket gone, command dropped");
            self.inner.metrics.record_dropped();
        }

        handed_off
    }

    /// Closes the socket and cancels any pending reconnection.
    pub fn close(&self) {
        {
            let mut slot = self.inner.outbound_slot();
            if let Some(tx) = slot.take() {
                let _ = tx.send(Outbound::Close);
            }
            self.inner.state.send_if_modified(|state| {
                self.inner.epoch.fetch_add(1, Ordering::SeqCst);
                let changed = *state != ConnectionState::Disconnected;
                *state = ConnectionState::Disconnected;
                changed
            });
        }
        self.inner.shutdown.notify_waiters();
        info!("bridge connection closed by client");
    }
}

impl Inner {
    fn outbound_slot(&self) -> MutexGuard<'_, OutboundSlot> {
        self.outbound.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, next: ConnectionState) {
        let changed = self.state.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
        if changed {
            debug!(state = %next, "connection state changed");
        }
    }

    /// Sets the state only if `token` is still the current epoch.
    fn settle(&self, token: u64, next: ConnectionState) -> bool {
        let _slot = self.outbound_slot();
        if self.epoch.load(Ordering::SeqCst) != token {
            return false;
        }
        self.set_state(next);
        true
    }

    async fn open(&self) -> Result<WsStream, WsError> {
        let (stream, _) = tokio_tungstenite::connect_async(self.config.url.as_str())
            .await
            .map_err(|e| WsError::Connection {
                url: self.config.url.clone(),
                reason: e.to_string(),
            })?;
        Ok(stream)
    }

    /// Installs a fresh outbound channel and moves to Connected, unless the
    /// epoch moved past `token` in the meantime.
    fn attach(&self, token: u64) -> Option<(u64, mpsc::UnboundedReceiver<Outbound>)> {
        let mut slot = self.outbound_slot();
        let epoch = token.wrapping_add(1);
        if self
            .epoch
            .compare_exchange(token, epoch, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        *slot = Some(tx);
        self.set_state(ConnectionState::Connected);
        info!(epoch, "bridge connected");

        Some((epoch, rx))
    }

    async fn supervise(
        self: Arc<Self>,
        stream: WsStream,
        epoch: u64,
        outbound_rx: mpsc::UnboundedReceiver<Outbound>,
    ) {
        let mut backoff = Backoff::new(self.config.reconnect.clone());
        let mut current = Some((stream, epoch, outbound_rx));

        while let Some((stream, epoch, outbound_rx)) = current.take() {
            let reason = self.pump(stream, outbound_rx).await;

            {
                let mut slot = self.outbound_slot();
                if self.epoch.load(Ordering::SeqCst) != epoch {
                    debug!(epoch, %reason, "socket task superseded");
                    return;
                }
                slot.take();
                warn!(epoch, %reason, "bridge connection lost");

                if !self.config.reconnect.enabled {
                    self.set_state(ConnectionState::Disconnected);
                    return;
                }
                self.set_state(ConnectionState::Reconnecting);
            }

            current = self.reconnect(epoch, &mut backoff).await;
        }
    }

    async fn reconnect(
        &self,
        token: u64,
        backoff: &mut Backoff,
    ) -> Option<(WsStream, u64, mpsc::UnboundedReceiver<Outbound>)> {
        loop {
            let Some(delay) = backoff.next_delay() else {
                warn!(attempts = backoff.attempts(), "giving up on reconnection");
                self.settle(token, ConnectionState::Disconnected);
                return None;
            };

            debug!(?delay, attempt = backoff.attempts(), "scheduling reconnect");
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.shutdown.notified() => {}
            }

            if self.epoch.load(Ordering::SeqCst) != token {
                return None;
            }

            match self.open().await {
                Ok(stream) => {
                    let (epoch, outbound_rx) = self.attach(token)?;
                    backoff.reset();
                    self.metrics.record_reconnect();
                    return Some((stream, epoch, outbound_rx));
                }
                Err(e) => {
                    warn!(attempt = backoff.attempts(), error = %e, "reconnect attempt failed");
                }
            }
        }
    }

    /// Moves frames in both directions until the socket ends or the client
    /// asks to close. Returns the reason the socket stopped.
    async fn pump(
        &self,
        stream: WsStream,
        mut outbound_rx: mpsc::UnboundedReceiver<Outbound>,
    ) -> String {
        let (mut sink, mut source) = stream.split();
        let mut heartbeat = self.config.heartbeat_interval.map(|period| {
            tokio::time::interval_at(tokio::time::Instant::now() + period, period)
        });

        loop {
            tokio::select! {
                incoming = source.next() => match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if self.inbound.send(text.as_str().to_owned()).await.is_err() {
                            return "inbound receiver dropped".to_string();
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        return format!("closed by bridge: {:?}", frame);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return format!("socket error: {}", e),
                    None => return "stream ended".to_string(),
                },
                command = outbound_rx.recv() => match command {
                    Some(Outbound::Text(frame)) => {
                        if let Err(e) = sink.send(Message::Text(frame.into())).await {
                            return format!("send failed: {}", e);
                        }
                    }
                    Some(Outbound::Close) | None => {
                        let _ = sink.send(Message::Close(None)).await;
                        return "closed by client".to_string();
                    }
                },
                _ = next_heartbeat(&mut heartbeat) => {
                    if let Err(e) = sink.send(Message::Ping(Default::default())).await {
                        return format!("heartbeat failed: {}", e);
                    }
                }
            }
        }
    }
}

async fn next_heartbeat(heartbeat: &mut Option<Interval>) {
    match heartbeat {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
