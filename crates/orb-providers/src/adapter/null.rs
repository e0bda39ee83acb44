//! Null provider adapter
//!
//! Accepts every call and never produces capacity. Useful as a default
//! binding when no real provider is configured and for exercising the
//! partial-fulfillment paths.

use async_trait::async_trait;
use orb_domain::entities::ProviderCapabilities;
use orb_domain::error::Result;
use orb_domain::ports::{ProviderAdapter, ProvisionRequest, TerminationTarget};
use orb_domain::value_objects::{InstanceDescriptor, Membership, ResourceHandle};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// No-op provider adapter
pub struct NullProviderAdapter {
    name: String,
    capabilities: ProviderCapabilities,
    sequence: AtomicU64,
}

impl NullProviderAdapter {
    /// Create a null adapter for the named provider instance
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: ProviderCapabilities::all(),
            sequence: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl ProviderAdapter for NullProviderAdapter {
    fn provider_name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities.clone()
    }

    async fn create(&self, request: &ProvisionRequest) -> Result<ResourceHandle> {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(ResourceHandle::new(
            format!("null-{}", n),
            request.template.effective_api(),
        ))
    }

    async fn list_members(&self, _handle: &ResourceHandle) -> Result<Membership> {
        Ok(Membership {
            instance_ids: Vec::new(),
            fulfilled: true,
        })
    }

    async fn describe_instances(&self, _instance_ids: &[String]) -> Result<Vec<InstanceDescriptor>> {
        Ok(Vec::new())
    }

    async fn terminate(&self, _target: &TerminationTarget) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

use orb_application::ports::registry::{
    PROVIDER_ADAPTERS, ProviderAdapterConfig, ProviderAdapterEntry,
};

/// Factory function for creating null adapters.
fn null_adapter_factory(
    config: &ProviderAdapterConfig,
) -> std::result::Result<Arc<dyn ProviderAdapter>, String> {
    let mut adapter = NullProviderAdapter::new(&config.instance_name);
    if let Some(capabilities) = &config.capabilities {
        adapter.capabilities = capabilities.clone();
    }
    Ok(Arc::new(adapter))
}

#[linkme::distributed_slice(PROVIDER_ADAPTERS)]
static NULL_ADAPTER: ProviderAdapterEntry = ProviderAdapterEntry {
    name: "null",
    description: "No-op adapter that never produces capacity",
    factory: null_adapter_factory,
};
