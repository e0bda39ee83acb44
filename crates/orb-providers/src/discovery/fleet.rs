use async_trait::async_trait;
use orb_application::ports::{DiscoveryResult, ResourceDiscovery};
use orb_domain::error::{Error, Result};
use orb_domain::ports::ProviderAdapter;
use orb_domain::value_objects::{FleetType, ProviderApi, ResourceHandle};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::{describe, list_members};

/// Discovery for EC2 fleets
///
/// Instant fleets return their instances from the create call and are
/// described directly. Request and maintain fleets fill asynchronously,
/// so membership is listed first and the fleet's own fulfilled flag
/// decides whether it is settled.
#[derive(Debug, Clone, Copy, Default)]
pub struct FleetDiscovery;

#[async_trait]
impl ResourceDiscovery for FleetDiscovery {
    fn api(&self) -> ProviderApi {
        ProviderApi::EC2Fleet
    }

    async fn discover(
        &self,
        adapter: &dyn ProviderAdapter,
        handle: &ResourceHandle,
        cancel: &CancellationToken,
    ) -> Result<DiscoveryResult> {
        if handle.fleet_type == Some(FleetType::Instant) {
            let instances = describe(adapter, &handle.instance_ids, cancel).await?;
            if instances.is_empty() && !handle.instance_ids.is_empty() {
                return Err(Error::resource_not_found(&handle.id));
            }
            return Ok(DiscoveryResult {
                instances,
                settled: true,
            });
        }

        let membership = list_members(adapter, handle, cancel).await?;
        trace!(handle = %handle, members = membership.instance_ids.len(), fulfilled = membership.fulfilled, "Fleet membership");
        let instances = describe(adapter, &membership.instance_ids, cancel).await?;
        Ok(DiscoveryResult {
            instances,
            settled: membership.fulfilled,
        })
    }
}
