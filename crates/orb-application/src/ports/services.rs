//! Application Service Port Interfaces

use async_trait::async_trait;
use orb_domain::entities::Template;
use orb_domain::error::Result;
use orb_domain::value_objects::{RequestFilter, RequestId, RequestStatus, RequestView};

// ============================================================================
// Request Orchestrator Interface
// ============================================================================

/// Orchestrator API consumed by front ends and the reconciliation scheduler
///
/// Creation-time failures (unknown template, selection, validation) are
/// returned to the caller and leave nothing persisted. Failures after the
/// request is persisted are recorded on the request (`FAILED` plus
/// `last_error`) and observed through [`get_request_status`].
///
/// [`get_request_status`]: RequestOrchestratorInterface::get_request_status
#[async_trait]
pub trait RequestOrchestratorInterface: Send + Sync {
    /// Create a request for `count` instances of a stored template
    async fn create_request(&self, template_id: &str, count: u32) -> Result<RequestId>;

    /// Create a request for `count` instances of the given template
    async fn create_request_from_template(
        &self,
        template: &Template,
        count: u32,
    ) -> Result<RequestId>;

    /// Current view of a request and its machines
    async fn get_request_status(&self, request_id: &RequestId) -> Result<RequestView>;

    /// Cancel an active request; fails with `InvalidState` once terminal
    async fn cancel_request(&self, request_id: &RequestId) -> Result<()>;

    /// Requests matching a filter, oldest first
    async fn list_requests(&self, filter: &RequestFilter) -> Result<Vec<RequestView>>;

    /// Run one reconciliation cycle and return the resulting status
    async fn reconcile(&self, request_id: &RequestId) -> Result<RequestStatus>;
}
