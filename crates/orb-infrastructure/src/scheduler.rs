//! Reconciliation Scheduler
//!
//! Drives the orchestrator's reconciliation cycle in the background:
//!
//! - one polling task per active request, reconciling every poll interval
//!   plus or minus jitter until the request becomes terminal
//! - a periodic storage scan that picks up active requests nobody polls
//!   (created before a restart, or created without [`track`])
//!
//! Every task stops on [`shutdown`].
//!
//! [`track`]: ReconciliationScheduler::track
//! [`shutdown`]: ReconciliationScheduler::shutdown

use crate::config::ReconciliationConfig;
use dashmap::DashSet;
use orb_application::domain_services::RandomSource;
use orb_application::ports::RequestOrchestratorInterface;
use orb_domain::error::{Error, Result};
use orb_domain::value_objects::{RequestFilter, RequestId};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Scheduler timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Nominal time between polls of one request
    pub poll_interval: Duration,
    /// Maximum deviation from the poll interval
    pub poll_jitter: Duration,
    /// Time between storage scans
    pub scan_interval: Duration,
}

impl From<&ReconciliationConfig> for SchedulerConfig {
    fn from(config: &ReconciliationConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            poll_jitter: config.poll_jitter(),
            scan_interval: config.scan_interval(),
        }
    }
}

/// Background reconciliation of active requests
pub struct ReconciliationScheduler {
    orchestrator: Arc<dyn RequestOrchestratorInterface>,
    config: SchedulerConfig,
    random: Arc<dyn RandomSource>,
    tracked: DashSet<RequestId>,
    cancel: CancellationToken,
}

impl ReconciliationScheduler {
    /// Create a scheduler; nothing runs until [`track`](Self::track) or [`spawn`](Self::spawn)
    pub fn new(
        orchestrator: Arc<dyn RequestOrchestratorInterface>,
        config: SchedulerConfig,
        random: Arc<dyn RandomSource>,
    ) -> Arc<Self> {
        Arc::new(Self {
            orchestrator,
            config,
            random,
            tracked: DashSet::new(),
            cancel: CancellationToken::new(),
        })
    }

    /// Start polling a request; returns `false` if it is already polled
    pub fn track(self: &Arc<Self>, request_id: RequestId) -> bool {
        if self.cancel.is_cancelled() || !self.tracked.insert(request_id.clone()) {
            return false;
        }
        let scheduler = Arc::clone(self);
        tokio::spawn(async move { scheduler.poll(request_id).await });
        true
    }

    /// Track every active request in storage; returns how many were newly tracked
    pub async fn scan(self: &Arc<Self>) -> Result<usize> {
        let active = self
            .orchestrator
            .list_requests(&RequestFilter::active())
            .await?;
        let added = active
            .into_iter()
            .filter(|view| self.track(view.request_id.clone()))
            .count();
        if added > 0 {
            info!(added, "Picked up untracked active requests");
        }
        Ok(added)
    }

    /// Run the periodic storage scan until shutdown
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            info!(
                scan_interval_secs = scheduler.config.scan_interval.as_secs(),
                "Reconciliation scheduler started"
            );
            loop {
                if let Err(e) = scheduler.scan().await {
                    warn!(error = %e, "Request scan failed");
                }
                tokio::select! {
                    _ = scheduler.cancel.cancelled() => break,
                    _ = tokio::time::sleep(scheduler.config.scan_interval) => {}
                }
            }
            info!("Reconciliation scheduler stopped");
        })
    }

    /// Stop scanning and every polling task
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Whether [`shutdown`](Self::shutdown) was called
    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Requests currently polled
    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Whether a request is currently polled
    pub fn is_tracked(&self, request_id: &RequestId) -> bool {
        self.tracked.contains(request_id)
    }

    /// Poll interval with jitter applied
    pub fn next_delay(&self) -> Duration {
        let jitter = u64::try_from(self.config.poll_jitter.as_millis()).unwrap_or(u64::MAX);
        let offset = self.random.next_in_range(0, jitter.saturating_mul(2));
        let base = self.config.poll_interval + Duration::from_millis(offset);
        base.saturating_sub(Duration::from_millis(jitter))
    }

    async fn poll(self: Arc<Self>, request_id: RequestId) {
        debug!(request_id = %request_id, "Polling started");
        loop {
            match self.orchestrator.reconcile(&request_id).await {
                Ok(status) if status.is_terminal() => {
                    debug!(
                        request_id = %request_id,
                        status = %status,
                        "Request reached terminal state"
                    );
                    break;
                }
                Ok(_) => {}
                Err(Error::NotFound { .. }) => {
                    warn!(request_id = %request_id, "Tracked request no longer exists");
                    break;
                }
                Err(e) => {
                    warn!(request_id = %request_id, error = %e, "Reconciliation cycle failed")
                }
            }
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.next_delay()) => {}
            }
        }
        self.tracked.remove(&request_id);
    }
}
