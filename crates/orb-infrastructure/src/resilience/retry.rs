//! Retry policy
//!
//! Exponential backoff capped at a maximum, plus uniform random jitter.

use crate::config::ResilienceConfig;
use orb_application::domain_services::RandomSource;
use std::time::Duration;

/// Retry policy for transient provider errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per call, including the first
    pub max_attempts: u32,
    /// Backoff after the first failure
    pub base_delay: Duration,
    /// Backoff ceiling before jitter
    pub max_delay: Duration,
    /// Upper bound of the random jitter
    pub jitter: Duration,
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    /// Whether another attempt may follow `attempt` (1-based)
    pub fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay after the `attempt`-th failure (1-based)
    ///
    /// `base * 2^(attempt-1)`, capped at `max_delay`, plus jitter in `[0, jitter]`.
    pub fn backoff(&self, attempt: u32, random: &dyn RandomSource) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let delay = self
            .base_delay
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_delay)
            .min(self.max_delay);
        let jitter_ms = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        delay + Duration::from_millis(random.next_in_range(0, jitter_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&ResilienceConfig::default())
    }
}

impl From<&ResilienceConfig> for RetryPolicy {
    fn from(config: &ResilienceConfig) -> Self {
        Self {
            max_attempts: config.retry_attempts.max(1),
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
            jitter: Duration::from_millis(config.retry_jitter_ms),
        }
    }
}
