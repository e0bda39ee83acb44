//! Provider Invoker Port
//!
//! Every provider call the orchestrator makes goes through this port. The
//! implementation owns retry, circuit breaking, per-provider concurrency
//! bounds and create-time fallback.

use async_trait::async_trait;
use orb_domain::error::Result;
use orb_domain::ports::{ProvisionRequest, TerminationTarget};
use orb_domain::value_objects::{ProviderSelectionResult, ResourceHandle};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::discovery::DiscoveryResult;

/// Result of a successful create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOutcome {
    /// Instance that served the call (primary or fallback)
    pub provider_name: String,
    /// Type of that instance
    pub provider_type: String,
    /// Provider-side resource
    pub handle: ResourceHandle,
    /// Adapter calls made across all candidates
    pub attempts: u32,
    /// Whether an alternative instance served the call
    pub fell_back: bool,
}

/// Resilient provider invocation
#[async_trait]
pub trait ProviderInvoker: Send + Sync {
    /// Create capacity on the selected instance, falling back to alternatives
    async fn create(
        &self,
        request: &ProvisionRequest,
        selection: &ProviderSelectionResult,
    ) -> Result<CreateOutcome>;

    /// Discover the instances behind a resource handle on one instance
    ///
    /// Once `cancel` fires no further adapter call or retry is started and
    /// the result is `Error::Cancelled`.
    async fn discover(
        &self,
        provider: &str,
        handle: &ResourceHandle,
        cancel: &CancellationToken,
    ) -> Result<DiscoveryResult>;

    /// Terminate a resource or instances on one instance
    ///
    /// Termination is the cleanup path of a cancel and ignores cancellation.
    async fn terminate(&self, provider: &str, target: &TerminationTarget) -> Result<()>;
}
