//! Exponential reconnection backoff.

use std::time::Duration;

/// Delay before the first retry.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(500);

/// Upper bound on any retry delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Backoff configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Multiplier applied per consecutive failure.
    pub factor: u32,
    /// Delay cap.
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self { initial_delay: DEFAULT_INITIAL_DELAY, factor: 2, max_delay: DEFAULT_MAX_DELAY }
    }
}

/// Retry delay generator.
///
/// Unbounded: retries continue forever, the delay just stops growing at
/// `max_delay`. The attempt counter resets when a link opens.
#[derive(Debug, Clone)]
pub struct Backoff {
    config: BackoffConfig,
    attempt: u32,
}

impl Backoff {
    /// Create a backoff with no recorded failures.
    pub fn new(config: BackoffConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Delay for the next retry, advancing the attempt counter.
    pub fn next_delay(&mut self) -> Duration {
        let multiplier = self.config.factor.max(1).saturating_pow(self.attempt);
        self.attempt = self.attempt.saturating_add(1);
        self.config.initial_delay.saturating_mul(multiplier).min(self.config.max_delay)
    }

    /// Consecutive failures since the last successful open.
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Forget previous failures.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(BackoffConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_until_cap() {
        let mut backoff = Backoff::default();
        let delays: Vec<_> = (0..9).map(|_| backoff.next_delay().as_millis()).collect();
        assert_eq!(delays, vec![500, 1000, 2000, 4000, 8000, 16000, 30000, 30000, 30000]);
    }

    #[test]
    fn reset_restarts_from_initial() {
        let mut backoff = Backoff::default();
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.next_delay(), DEFAULT_INITIAL_DELAY);
    }

    #[test]
    fn huge_attempt_counts_stay_capped() {
        let mut backoff = Backoff::default();
        for _ in 0..200 {
            assert!(backoff.next_delay() <= DEFAULT_MAX_DELAY);
        }
    }
}
