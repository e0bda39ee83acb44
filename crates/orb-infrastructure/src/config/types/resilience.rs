//! Resilience configuration types

use crate::constants::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Resilience configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Attempts per provider call, including the first
    pub retry_attempts: u32,

    /// Backoff before the first retry in milliseconds
    pub retry_base_delay_ms: u64,

    /// Backoff ceiling in milliseconds
    pub retry_max_delay_ms: u64,

    /// Random jitter ceiling added to each backoff in milliseconds
    pub retry_jitter_ms: u64,

    /// Consecutive transient failures that open a circuit
    pub circuit_breaker_failure_threshold: u32,

    /// Seconds an open circuit waits before a trial call
    pub circuit_breaker_recovery_timeout_secs: u64,

    /// Concurrent calls allowed per provider instance
    pub max_concurrent_calls: usize,
}

/// Returns default resilience configuration with:
/// - 3 attempts with exponential backoff from 200ms up to 10s plus up to 100ms jitter
/// - Circuit opening after 5 consecutive transient failures, probing after 60s
/// - 8 concurrent calls per provider instance
impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retry_attempts: RETRY_DEFAULT_ATTEMPTS,
            retry_base_delay_ms: RETRY_BASE_DELAY_MS,
            retry_max_delay_ms: RETRY_MAX_DELAY_MS,
            retry_jitter_ms: RETRY_JITTER_MS,
            circuit_breaker_failure_threshold: CIRCUIT_BREAKER_FAILURE_THRESHOLD,
            circuit_breaker_recovery_timeout_secs: CIRCUIT_BREAKER_RECOVERY_TIMEOUT_SECS,
            max_concurrent_calls: PROVIDER_MAX_CONCURRENT_CALLS,
        }
    }
}

impl ResilienceConfig {
    /// Recovery timeout as a duration
    pub fn recovery_timeout(&self) -> Duration {
        Duration::from_secs(self.circuit_breaker_recovery_timeout_secs)
    }
}
