//! Terminal service.
//!
//! Reads commands line by line, forwards them to the sync client and logs
//! every store change and notification.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bridgesync_sdk::notification::NotificationReceiver;
use bridgesync_sdk::{Candle, ClientError, Dispatch, OrderCommand, SyncClient};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use super::commands::{OrderArgs, TerminalCommand, USAGE};
use super::config::TerminalConfig;
use super::render;

/// Whether the read loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading.
    Continue,
    /// Stop the service.
    Quit,
}

/// The terminal service.
pub struct TerminalService {
    /// Configuration.
    config: TerminalConfig,

    /// Sync client.
    client: SyncClient,

    /// Whether the service is running.
    running: AtomicBool,
}

impl TerminalService {
    /// Creates a service around a started client.
    #[must_use]
    pub fn new(config: TerminalConfig, client: SyncClient) -> Self {
        Self {
            config,
            client,
            running: AtomicBool::new(false),
        }
    }

    /// Returns the sync client.
    #[must_use]
    pub const fn client(&self) -> &SyncClient {
        &self.client
    }

    /// Returns true if the service is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Stops the service.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
        info!("Terminal stop requested");
    }

    /// Runs until `quit`, [`TerminalService::stop`], or the caller drops the
    /// future. End of input stops command reading but keeps rendering.
    pub async fn run<R>(&self, input: R, mut notifications: NotificationReceiver)
    where
        R: AsyncBufRead + Unpin,
    {
        self.running.store(true, Ordering::Relaxed);

        let mut lines = input.lines();
        let mut input_open = true;
        let mut market = self.client.watch_market();
        let mut positions = self.client.watch_positions();
        let mut state = self.client.watch_state();
        let mut shown_series: Arc<[Candle]> = Arc::clone(&market.borrow().series);

        info!("Terminal started, tracking {}", self.client.market().subscription);
        info!("{}", USAGE);

        while self.is_running() {
            tokio::select! {
                line = lines.next_line(), if input_open => match line {
                    Ok(Some(line)) => {
                        if !line.trim().is_empty() && self.handle_line(&line) == Flow::Quit {
                            self.stop();
                        }
                    }
                    Ok(None) => {
                        debug!("Input closed");
                        input_open = false;
                    }
                    Err(e) => {
                        warn!("Failed to read input: {}", e);
                        input_open = false;
                    }
                },
                Some(notification) = notifications.recv() => {
                    if notification.is_failure() {
                        warn!("{}", notification);
                    } else {
                        info!("{}", notification);
                    }
                }
                Ok(()) = market.changed() => {
                    let snapshot = market.borrow_and_update().clone();
                    if Arc::ptr_eq(&shown_series, &snapshot.series) {
                        if let Some(quote) = &snapshot.quote {
                            debug!("{}", render::quote_line(quote));
                        }
                    } else {
                        info!("{}", render::series_line(&snapshot));
                        shown_series = snapshot.series;
                    }
                }
                Ok(()) = positions.changed() => {
                    let snapshot = positions.borrow_and_update().clone();
                    info!("{}", render::positions_line(&snapshot));
                }
                Ok(()) = state.changed() => {
                    let current = *state.borrow_and_update();
                    info!("Connection {}", current);
                }
                else => break,
            }
        }

        info!("Terminal stopped");
    }

    /// Parses and executes one input line.
    pub fn handle_line(&self, line: &str) -> Flow {
        match line.parse::<TerminalCommand>() {
            Ok(command) => self.execute(command),
            Err(e) => {
                warn!("{} (type 'help' for usage)", e);
                Flow::Continue
            }
        }
    }

    /// Executes one command.
    pub fn execute(&self, command: TerminalCommand) -> Flow {
        let result = match command {
            TerminalCommand::Order(args) => self.client.place_order(&self.order_command(&args)),
            TerminalCommand::Close(ticket) => Ok(self.client.close_position(ticket)),
            TerminalCommand::Timeframe(timeframe) => {
                let symbol = self.client.market().subscription.symbol;
                self.client.change_subscription(&symbol, timeframe)
            }
            TerminalCommand::Symbol(symbol) => {
                let timeframe = self.client.market().subscription.timeframe;
                self.client.change_subscription(&symbol, timeframe)
            }
            TerminalCommand::Positions => {
                self.show_positions();
                Ok(self.client.refresh_positions())
            }
            TerminalCommand::Tick => self.client.refresh_quote(),
            TerminalCommand::Status => {
                self.show_status();
                return Flow::Continue;
            }
            TerminalCommand::Help => {
                info!("{}", USAGE);
                return Flow::Continue;
            }
            TerminalCommand::Quit => return Flow::Quit,
        };

        report(result);
        Flow::Continue
    }

    fn order_command(&self, args: &OrderArgs) -> OrderCommand {
        let symbol = self.client.market().subscription.symbol;
        let volume = args.volume.unwrap_or(self.config.default_volume);

        let mut command = OrderCommand::new(symbol, args.side, volume);
        if let Some(sl) = args.stop_loss {
            command = command.with_stop_loss(sl);
        }
        if let Some(tp) = args.take_profit {
            command = command.with_take_profit(tp);
        }
        command
    }

    fn show_positions(&self) {
        let snapshot = self.client.positions();
        info!("{}", render::positions_line(&snapshot));
        for position in snapshot.positions() {
            info!("  {}", render::position_line(position));
        }
    }

    fn show_status(&self) {
        let market = self.client.market();
        info!(
            "{}",
            render::status_line(self.client.connection_state(), &self.client.metrics())
        );
        info!("{}", render::series_line(&market));
        if let Some(quote) = &market.quote {
            info!("{}", render::quote_line(quote));
        }
        info!("{}", render::positions_line(&self.client.positions()));
    }
}

fn report(result: Result<Dispatch, ClientError>) {
    match result {
        Ok(Dispatch::Sent(request_id)) => debug!("Command sent (request id {:?})", request_id),
        Ok(Dispatch::Dropped) => warn!("Not connected, command dropped"),
        Err(e) => warn!("{}", e),
    }
}
