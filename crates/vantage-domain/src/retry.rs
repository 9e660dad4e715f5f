//! Bounded retry-with-backoff policy
//!
//! Pure data: the async and sync retry loops live next to the clients that use
//! them (`vantage-llm`, `vantage-store`). Delays double per attempt, starting
//! from `base_delay_ms` and capped at `max_delay_ms`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How many times, and how patiently, a transient failure is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one (minimum 1)
    pub max_attempts: u32,

    /// Delay before the second attempt, in milliseconds
    pub base_delay_ms: u64,

    /// Upper bound on any single delay, in milliseconds
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    /// 3 attempts: 1s, then 2s between them
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    /// A policy with no sleeping between attempts (tests)
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    /// Attempts actually allowed; zero is treated as one
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait after the given failed attempt (1-based)
    ///
    /// # Examples
    ///
    /// ```
    /// use vantage_domain::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::default();
    /// assert_eq!(policy.delay_after(1), Duration::from_secs(1));
    /// assert_eq!(policy.delay_after(2), Duration::from_secs(2));
    /// assert_eq!(policy.delay_after(3), Duration::from_secs(4));
    /// ```
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(20);
        let delay = self.base_delay_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(delay.min(self.max_delay_ms))
    }
}
