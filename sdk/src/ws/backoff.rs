//! Reconnect delay schedule.
//!
//! Capped exponential backoff: the base delay doubles after each attempt up
//! to the configured maximum, and every delay gets up to `jitter` of itself
//! added at random.

use std::time::Duration;

use super::config::ReconnectPolicy;

/// Backoff state for one outage.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: ReconnectPolicy,
    current: Duration,
    attempts: u32,
}

impl Backoff {
    /// Creates a backoff schedule from a policy.
    #[must_use]
    pub fn new(policy: ReconnectPolicy) -> Self {
        let current = policy.initial_delay;
        Self {
            policy,
            current,
            attempts: 0,
        }
    }

    /// Returns the number of delays handed out since the last reset.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns the next delay, or None once the attempt budget is spent.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self
            .policy
            .max_attempts
            .is_some_and(|max| self.attempts >= max)
        {
            return None;
        }

        self.attempts = self.attempts.saturating_add(1);
        let base = self.current;
        self.current = base.saturating_mul(2).min(self.policy.max_delay);

        Some(self.with_jitter(base))
    }

    /// Resets the schedule after a successful connection.
    pub fn reset(&mut self) {
        self.current = self.policy.initial_delay;
        self.attempts = 0;
    }

    fn with_jitter(&self, delay: Duration) -> Duration {
        if self.policy.jitter <= 0.0 {
            return delay;
        }
        let factor = 1.0 + rand::random::<f64>() * self.policy.jitter;
        delay.mul_f64(factor)
    }
}
