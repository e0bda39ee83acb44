//! Reconciliation Assessment
//!
//! Pure decision of a request's next status from what discovery observed.
//! The orchestrator gathers a [`FulfillmentSnapshot`] each cycle and applies
//! the returned [`Assessment`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What to do when capacity stops short of the requested count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PartialFulfillmentPolicy {
    /// Fail the whole request
    #[default]
    FailRequest,
    /// Complete with the running subset
    AcceptPartial,
}

/// Reconciliation tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationPolicy {
    /// Maximum time a request may stay active
    pub request_timeout: Duration,
    /// Behaviour on partial fulfillment
    pub partial_fulfillment: PartialFulfillmentPolicy,
    /// Record machines beyond the requested count (only with `AcceptPartial`)
    pub allow_overfulfillment: bool,
    /// Consecutive failed polls before the request fails
    pub max_failed_polls: u32,
    /// Reload-and-retry attempts on storage version conflicts
    pub version_conflict_retries: u32,
}

impl Default for ReconciliationPolicy {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(1800),
            partial_fulfillment: PartialFulfillmentPolicy::FailRequest,
            allow_overfulfillment: false,
            max_failed_polls: 10,
            version_conflict_retries: 3,
        }
    }
}

impl ReconciliationPolicy {
    /// How many newly discovered machines may be recorded
    ///
    /// `live` counts recorded machines that are not terminated or failed;
    /// replaced members do not hold a slot.
    pub fn admissible_new_machines(&self, live: usize, requested: u32) -> usize {
        if self.allow_overfulfillment
            && self.partial_fulfillment == PartialFulfillmentPolicy::AcceptPartial
        {
            return usize::MAX;
        }
        (requested as usize).saturating_sub(live)
    }
}

/// Machine counts observed for one request in one cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FulfillmentSnapshot {
    /// Instances requested
    pub requested: u32,
    /// Machines running
    pub running: u32,
    /// Machines still launching
    pub pending: u32,
    /// Every resource handle reported that no more capacity is coming
    pub settled: bool,
    /// The request outlived its timeout
    pub timed_out: bool,
}

/// Next status decided for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assessment {
    /// Keep reconciling
    InProgress,
    /// Requested (or accepted partial) capacity is running
    Complete,
    /// Give up with the given reason
    Fail(String),
    /// Give up because of the timeout
    Timeout,
}

/// Decide the next status
pub fn assess(snapshot: &FulfillmentSnapshot, policy: &ReconciliationPolicy) -> Assessment {
    if snapshot.running >= snapshot.requested {
        return Assessment::Complete;
    }
    let accept_partial = policy.partial_fulfillment == PartialFulfillmentPolicy::AcceptPartial;

    if snapshot.timed_out {
        if accept_partial && snapshot.running > 0 {
            return Assessment::Complete;
        }
        return Assessment::Timeout;
    }

    if snapshot.settled && snapshot.pending == 0 {
        if accept_partial && snapshot.running > 0 {
            return Assessment::Complete;
        }
        return Assessment::Fail(format!(
            "partial fulfillment: {} of {} instances running",
            snapshot.running, snapshot.requested
        ));
    }

    Assessment::InProgress
}
