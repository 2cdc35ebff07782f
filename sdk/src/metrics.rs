//! Synchronization metrics.
//!
//! Provides atomic counters for monitoring frame routing and command
//! dispatch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Metrics for one client.
#[derive(Debug)]
pub struct SyncMetrics {
    /// Inbound frames received from the socket.
    frames_received: AtomicU64,

    /// Frames that updated a store or produced a notification.
    frames_routed: AtomicU64,

    /// Frames with an unrecognized type.
    frames_ignored: AtomicU64,

    /// Frames rejected as malformed or schema-invalid.
    frames_rejected: AtomicU64,

    /// Frames dropped because they answer a superseded request.
    frames_stale: AtomicU64,

    /// Commands handed to the socket.
    commands_sent: AtomicU64,

    /// Commands dropped while not connected.
    commands_dropped: AtomicU64,

    /// Successful reconnections.
    reconnects: AtomicU64,

    /// Start time for uptime.
    start_time: Instant,
}

impl Default for SyncMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncMetrics {
    /// Creates a new metrics instance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames_received: AtomicU64::new(0),
            frames_routed: AtomicU64::new(0),
            frames_ignored: AtomicU64::new(0),
            frames_rejected: AtomicU64::new(0),
            frames_stale: AtomicU64::new(0),
            commands_sent: AtomicU64::new(0),
            commands_dropped: AtomicU64::new(0),
            reconnects: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a received frame.
    pub fn record_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a routed frame.
    pub fn record_routed(&self) {
        self.frames_routed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an ignored frame.
    pub fn record_ignored(&self) {
        self.frames_ignored.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a rejected frame.
    pub fn record_rejected(&self) {
        self.frames_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a stale frame.
    pub fn record_stale(&self) {
        self.frames_stale.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a sent command.
    pub fn record_sent(&self) {
        self.commands_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a dropped command.
    pub fn record_dropped(&self) {
        self.commands_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a successful reconnection.
    pub fn record_reconnect(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns frames received.
    #[must_use]
    pub fn frames_received(&self) -> u64 {
        self.frames_received.load(Ordering::Relaxed)
    }

    /// Returns frames routed.
    #[must_use]
    pub fn frames_routed(&self) -> u64 {
        self.frames_routed.load(Ordering::Relaxed)
    }

    /// Returns frames ignored.
    #[must_use]
    pub fn frames_ignored(&self) -> u64 {
        self.frames_ignored.load(Ordering::Relaxed)
    }

    /// Returns frames rejected.
    #[must_use]
    pub fn frames_rejected(&self) -> u64 {
        self.frames_rejected.load(Ordering::Relaxed)
    }

    /// Returns stale frames.
    #[must_use]
    pub fn frames_stale(&self) -> u64 {
        self.frames_stale.load(Ordering::Relaxed)
    }

    /// Returns commands sent.
    #[must_use]
    pub fn commands_sent(&self) -> u64 {
        self.commands_sent.load(Ordering::Relaxed)
    }

    /// Returns commands dropped.
    #[must_use]
    pub fn commands_dropped(&self) -> u64 {
        self.commands_dropped.load(Ordering::Relaxed)
    }

    /// Returns successful reconnections.
    #[must_use]
    pub fn reconnects(&self) -> u64 {
        self.reconnects.load(Ordering::Relaxed)
    }

    /// Returns the uptime.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns a snapshot of all metrics.
    #[must_use]
    pub fn snapshot(&self) -> SyncMetricsSnapshot {
        SyncMetricsSnapshot {
            frames_received: self.frames_received(),
            frames_routed: self.frames_routed(),
            frames_ignored: self.frames_ignored(),
            frames_rejected: self.frames_rejected(),
            frames_stale: self.frames_stale(),
            commands_sent: self.commands_sent(),
            commands_dropped: self.commands_dropped(),
            reconnects: self.reconnects(),
            uptime: self.uptime(),
        }
    }
}

/// A point-in-time snapshot of sync metrics.
#[derive(Debug, Clone)]
pub struct SyncMetricsSnapshot {
    /// Frames received.
    pub frames_received: u64,
    /// Frames routed.
    pub frames_routed: u64,
    /// Frames ignored.
    pub frames_ignored: u64,
    /// Frames rejected.
    pub frames_rejected: u64,
    /// Stale frames.
    pub frames_stale: u64,
    /// Commands sent.
    pub commands_sent: u64,
    /// Commands dropped.
    pub commands_dropped: u64,
    /// Reconnections.
    pub reconnects: u64,
    /// Uptime.
    pub uptime: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = SyncMetrics::new();
        assert_eq!(metrics.frames_received(), 0);
        assert_eq!(metrics.commands_sent(), 0);
    }

    #[test]
    fn test_metrics_frames() {
        let metrics = SyncMetrics::default();

        metrics.record_received();
        metrics.record_received();
        metrics.record_received();
        metrics.record_routed();
        metrics.record_ignored();
        metrics.record_rejected();

        assert_eq!(metrics.frames_received(), 3);
        assert_eq!(metrics.frames_routed(), 1);
        assert_eq!(metrics.frames_ignored(), 1);
        assert_eq!(metrics.frames_rejected(), 1);
    }

    #[test]
    fn test_metrics_commands() {
        let metrics = SyncMetrics::new();

        metrics.record_sent();
        metrics.record_dropped();
        metrics.record_dropped();

        assert_eq!(metrics.commands_sent(), 1);
        assert_eq!(metrics.commands_dropped(), 2);
    }

    #[test]
    fn test_metrics_snapshot() {
        let metrics = SyncMetrics::new();

        metrics.record_stale();
        metrics.record_reconnect();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.frames_stale, 1);
        assert_eq!(snapshot.reconnects, 1);
        assert_eq!(snapshot.frames_received, 0);
    }
}
