//! One-line summaries of the store contents for log output.

use bridgesync_sdk::metrics::SyncMetricsSnapshot;
use bridgesync_sdk::{ConnectionState, MarketSnapshot, Position, PositionsSnapshot, Quote};

/// Summarizes the candle series.
#[must_use]
pub fn series_line(market: &MarketSnapshot) -> String {
    match market.last_candle() {
        Some(last) => format!(
            "{} {} candles, last close {}{}",
            market.subscription,
            market.series.len(),
            last.close,
            last.open_time()
                .map(|t| format!(" at {}", t.format("%Y-%m-%d %H:%M")))
                .unwrap_or_default()
        ),
        None => format!("{} no candles yet", market.subscription),
    }
}

/// Summarizes a quote.
#[must_use]
pub fn quote_line(quote: &Quote) -> String {
    format!(
        "{} bid {} ask {} spread {:.5}",
        quote.symbol.as_deref().unwrap_or("-"),
        quote.bid,
        quote.ask,
        quote.spread()
    )
}

/// Summarizes one position.
#[must_use]
pub fn position_line(position: &Position) -> String {
    let mut line = format!(
        "#{} {} {} {} @ {} now {} P&L {:.2}",
        position.ticket,
        position.side,
        position.volume,
        position.symbol,
        position.price_open,
        position.price_current,
        position.profit
    );
    if let Some(sl) = position.stop_loss() {
        line.push_str(&format!(" sl {}", sl));
    }
    if let Some(tp) = position.take_profit() {
        line.push_str(&format!(" tp {}", tp));
    }
    line
}

/// Summarizes the positions store.
#[must_use]
pub fn positions_line(positions: &PositionsSnapshot) -> String {
    format!(
        "{} open position(s), total P&L {:.2}",
        positions.len(),
        positions.total_pnl()
    )
}

/// Summarizes connection state and counters.
#[must_use]
pub fn status_line(state: ConnectionState, metrics: &SyncMetricsSnapshot) -> String {
    format!(
        "{} | frames {} routed {} ignored {} rejected {} stale {} | commands {} dropped {} | reconnects {} | up {}s",
        state,
        metrics.frames_received,
        metrics.frames_routed,
        metrics.frames_ignored,
        metrics.frames_rejected,
        metrics.frames_stale,
        metrics.commands_sent,
        metrics.commands_dropped,
        metrics.reconnects,
        metrics.uptime.as_secs()
    )
}
