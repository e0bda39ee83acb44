//! Reconciliation configuration types

use crate::constants::*;
use orb_application::domain_services::{PartialFulfillmentPolicy, ReconciliationPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reconciliation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    /// Seconds between polls of one request
    pub poll_interval_secs: u64,

    /// Maximum deviation of each poll from the interval in milliseconds
    pub poll_jitter_ms: u64,

    /// Seconds between storage scans for untracked active requests
    pub scan_interval_secs: u64,

    /// Seconds a request may stay active before timing out
    pub request_timeout_secs: u64,

    /// Behaviour when capacity stops short (fail_request, accept_partial)
    pub partial_fulfillment: PartialFulfillmentPolicy,

    /// Record machines beyond the requested count (only with accept_partial)
    pub allow_overfulfillment: bool,

    /// Consecutive failed polls before a request fails
    pub max_failed_polls: u32,

    /// Reload-and-retry attempts after a storage version conflict
    pub version_conflict_retries: u32,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: RECONCILE_POLL_INTERVAL_SECS,
            poll_jitter_ms: RECONCILE_POLL_JITTER_MS,
            scan_interval_secs: RECONCILE_SCAN_INTERVAL_SECS,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            partial_fulfillment: PartialFulfillmentPolicy::FailRequest,
            allow_overfulfillment: false,
            max_failed_polls: RECONCILE_MAX_FAILED_POLLS,
            version_conflict_retries: VERSION_CONFLICT_RETRIES,
        }
    }
}

impl ReconciliationConfig {
    /// Lifecycle policy handed to the orchestrator
    pub fn policy(&self) -> ReconciliationPolicy {
        ReconciliationPolicy {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            partial_fulfillment: self.partial_fulfillment,
            allow_overfulfillment: self.allow_overfulfillment,
            max_failed_polls: self.max_failed_polls,
            version_conflict_retries: self.version_conflict_retries,
        }
    }

    /// Poll interval as a duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Poll jitter as a duration
    pub fn poll_jitter(&self) -> Duration {
        Duration::from_millis(self.poll_jitter_ms)
    }

    /// Scan interval as a duration
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }
}
