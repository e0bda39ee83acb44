use async_trait::async_trait;
use orb_application::ports::{DiscoveryResult, ResourceDiscovery};
use orb_domain::error::{Error, Result};
use orb_domain::ports::ProviderAdapter;
use orb_domain::value_objects::{ProviderApi, ResourceHandle};
use tokio_util::sync::CancellationToken;

use super::describe;

/// Discovery for direct instance launches
///
/// The handle already carries every instance id, so membership never
/// changes and the result is always settled.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunInstancesDiscovery;

#[async_trait]
impl ResourceDiscovery for RunInstancesDiscovery {
    fn api(&self) -> ProviderApi {
        ProviderApi::RunInstances
    }

    async fn discover(
        &self,
        adapter: &dyn ProviderAdapter,
        handle: &ResourceHandle,
        cancel: &CancellationToken,
    ) -> Result<DiscoveryResult> {
        let instances = describe(adapter, &handle.instance_ids, cancel).await?;
        if instances.is_empty() && !handle.instance_ids.is_empty() {
            return Err(Error::resource_not_found(&handle.id));
        }
        Ok(DiscoveryResult {
            instances,
            settled: true,
        })
    }
}
