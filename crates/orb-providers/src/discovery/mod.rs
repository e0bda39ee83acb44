//! Resource Discovery Strategies
//!
//! One strategy per provisioning API, each composed from the adapter
//! primitives `list_members` and `describe_instances`.
//!
//! | API | Strategy | Membership source |
//! |-----|----------|-------------------|
//! | RunInstances | [`RunInstancesDiscovery`] | instance ids in the handle |
//! | EC2Fleet | [`FleetDiscovery`] | handle ids (instant) or `list_members` |
//! | SpotFleet | [`SpotFleetDiscovery`] | `list_members` |
//! | ASG | [`AutoScalingGroupDiscovery`] | `list_members`, terminated members dropped |

mod auto_scaling;
mod fleet;
mod run_instances;
mod spot_fleet;

pub use auto_scaling::AutoScalingGroupDiscovery;
pub use fleet::FleetDiscovery;
pub use run_instances::RunInstancesDiscovery;
pub use spot_fleet::SpotFleetDiscovery;

use orb_application::ports::DiscoveryRegistry;
use orb_domain::error::{Error, Result};
use orb_domain::ports::ProviderAdapter;
use orb_domain::value_objects::{InstanceDescriptor, Membership, ResourceHandle};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Registry with a strategy for every supported API
pub fn default_discovery_registry() -> DiscoveryRegistry {
    DiscoveryRegistry::new()
        .with(Arc::new(RunInstancesDiscovery))
        .with(Arc::new(FleetDiscovery))
        .with(Arc::new(SpotFleetDiscovery))
        .with(Arc::new(AutoScalingGroupDiscovery))
}

fn ensure_live(cancel: &CancellationToken, operation: &str) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::cancelled(operation));
    }
    Ok(())
}

async fn list_members(
    adapter: &dyn ProviderAdapter,
    handle: &ResourceHandle,
    cancel: &CancellationToken,
) -> Result<Membership> {
    ensure_live(cancel, "list_members")?;
    adapter.list_members(handle).await
}

/// Describe `ids`, skipping the provider call when there is nothing to ask
async fn describe(
    adapter: &dyn ProviderAdapter,
    ids: &[String],
    cancel: &CancellationToken,
) -> Result<Vec<InstanceDescriptor>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    ensure_live(cancel, "describe_instances")?;
    adapter.describe_instances(ids).await
}
