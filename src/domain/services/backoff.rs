//! Retry Policy - attempt cap and backoff between attempts.

use rand::Rng;
use std::time::Duration;

/// Upper bound for a single backoff delay.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// How many times a region fetch is tried and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, initial one included
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on every further retry
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Whether another attempt is allowed after `attempts` have been made.
    pub fn should_retry(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }

    /// Delay to wait after the `attempt`-th failure (1-based).
    ///
    /// `base * 2^(attempt-1)`, capped, plus up to 10% jitter. A zero base
    /// always yields zero.
    pub fn backoff(&self, attempt: u32) -> Duration {
        if attempt == 0 || self.base_delay.is_zero() {
            return Duration::ZERO;
        }

        let base_ms = self.base_delay.as_millis().min(u64::MAX as u128) as u64;
        let exponential = 2u64.saturating_pow(attempt - 1);
        let capped_ms = base_ms
            .saturating_mul(exponential)
            .min(MAX_BACKOFF.as_millis() as u64);

        let jitter_range = capped_ms / 10;
        let jitter = if jitter_range > 0 {
            rand::thread_rng().gen_range(0..jitter_range)
        } else {
            0
        };

        Duration::from_millis(capped_ms + jitter)
    }
}
