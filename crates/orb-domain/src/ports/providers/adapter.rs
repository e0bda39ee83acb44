//! Provider Adapter Port
//!
//! One adapter instance serves one configured provider instance. Adapters
//! wrap the provider SDK and must classify every failure as
//! [`ProviderErrorKind::Transient`](crate::error::ProviderErrorKind) or
//! `Permanent`; a resource that no longer exists is reported as
//! [`Error::ResourceNotFound`](crate::error::Error::ResourceNotFound).
//!
//! Discovery is split into two primitives so API-specific strategies can
//! compose them: [`ProviderAdapter::list_members`] polls asynchronous
//! resources (fleets, spot fleets, groups) for their current membership, and
//! [`ProviderAdapter::describe_instances`] fetches per-instance details.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entities::{ProviderCapabilities, Template};
use crate::error::Result;
use crate::value_objects::{InstanceDescriptor, Membership, RequestId, ResourceHandle};

/// Input of a create call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionRequest {
    /// Request the capacity is created for
    pub request_id: RequestId,
    /// Template describing the capacity
    pub template: Template,
    /// Number of instances to create
    pub count: u32,
}

/// What to terminate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationTarget {
    /// A whole provider resource (fleet, spot fleet, group)
    Resource(ResourceHandle),
    /// Individual instances
    Instances(Vec<String>),
}

/// Provider adapter interface
///
/// # Example
///
/// ```ignore
/// let handle = adapter.create(&provision).await?;
/// let members = adapter.list_members(&handle).await?;
/// let instances = adapter.describe_instances(&members.instance_ids).await?;
/// adapter.terminate(&TerminationTarget::Resource(handle)).await?;
/// ```
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Provider instance this adapter serves
    fn provider_name(&self) -> &str;

    /// Capabilities the provider advertises
    fn capabilities(&self) -> ProviderCapabilities;

    /// Create capacity and return the provider-side handle
    async fn create(&self, request: &ProvisionRequest) -> Result<ResourceHandle>;

    /// Current membership of an asynchronous resource
    async fn list_members(&self, handle: &ResourceHandle) -> Result<Membership>;

    /// Per-instance details; unknown ids are omitted from the result
    async fn describe_instances(&self, instance_ids: &[String]) -> Result<Vec<InstanceDescriptor>>;

    /// Terminate a resource or a set of instances
    async fn terminate(&self, target: &TerminationTarget) -> Result<()>;
}
