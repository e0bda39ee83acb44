use async_trait::async_trait;
use orb_application::ports::{DiscoveryResult, ResourceDiscovery};
use orb_domain::error::Result;
use orb_domain::ports::ProviderAdapter;
use orb_domain::value_objects::{InstanceState, ProviderApi, ResourceHandle};
use tokio_util::sync::CancellationToken;

use super::{describe, list_members};

/// Discovery for auto-scaling groups
///
/// Groups replace unhealthy members on their own; terminated members are
/// history, not capacity, and are left out of the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoScalingGroupDiscovery;

#[async_trait]
impl ResourceDiscovery for AutoScalingGroupDiscovery {
    fn api(&self) -> ProviderApi {
        ProviderApi::ASG
    }

    async fn discover(
        &self,
        adapter: &dyn ProviderAdapter,
        handle: &ResourceHandle,
        cancel: &CancellationToken,
    ) -> Result<DiscoveryResult> {
        let membership = list_members(adapter, handle, cancel).await?;
        let mut instances = describe(adapter, &membership.instance_ids, cancel).await?;
        instances.retain(|i| i.state != InstanceState::Terminated);
        Ok(DiscoveryResult {
            instances,
            settled: membership.fulfilled,
        })
    }
}
