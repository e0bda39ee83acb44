use async_trait::async_trait;
use orb_application::ports::{DiscoveryResult, ResourceDiscovery};
use orb_domain::error::Result;
use orb_domain::ports::ProviderAdapter;
use orb_domain::value_objects::{ProviderApi, ResourceHandle};
use tokio_util::sync::CancellationToken;

use super::{describe, list_members};

/// Discovery for spot fleet requests
#[derive(Debug, Clone, Copy, Default)]
pub struct SpotFleetDiscovery;

#[async_trait]
impl ResourceDiscovery for SpotFleetDiscovery {
    fn api(&self) -> ProviderApi {
        ProviderApi::SpotFleet
    }

    async fn discover(
        &self,
        adapter: &dyn ProviderAdapter,
        handle: &ResourceHandle,
        cancel: &CancellationToken,
    ) -> Result<DiscoveryResult> {
        let membership = list_members(adapter, handle, cancel).await?;
        let instances = describe(adapter, &membership.instance_ids, cancel).await?;
        Ok(DiscoveryResult {
            instances,
            settled: membership.fulfilled,
        })
    }
}
