//! Resource Discovery Port
//!
//! Turning a resource handle into instance descriptors differs per
//! provisioning API. Each API gets one [`ResourceDiscovery`] strategy built
//! from the adapter primitives; [`DiscoveryRegistry`] is the lookup table
//! from API to strategy.

use async_trait::async_trait;
use orb_domain::error::{Error, Result};
use orb_domain::ports::ProviderAdapter;
use orb_domain::value_objects::{InstanceDescriptor, ProviderApi, ResourceHandle};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Instances behind a resource handle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryResult {
    /// Instances currently belonging to the resource
    pub instances: Vec<InstanceDescriptor>,
    /// Whether the provider has finished adding capacity to the resource
    pub settled: bool,
}

/// Discovery strategy for one provisioning API
#[async_trait]
pub trait ResourceDiscovery: Send + Sync {
    /// API this strategy handles
    fn api(&self) -> ProviderApi;

    /// Discover the instances behind `handle`
    ///
    /// A strategy making several adapter calls checks `cancel` before each
    /// one and returns `Error::Cancelled` instead of starting it.
    async fn discover(
        &self,
        adapter: &dyn ProviderAdapter,
        handle: &ResourceHandle,
        cancel: &CancellationToken,
    ) -> Result<DiscoveryResult>;
}

/// Lookup table from provisioning API to discovery strategy
#[derive(Default, Clone)]
pub struct DiscoveryRegistry {
    strategies: HashMap<ProviderApi, Arc<dyn ResourceDiscovery>>,
}

impl DiscoveryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy, replacing any previous one for its API
    pub fn register(&mut self, strategy: Arc<dyn ResourceDiscovery>) {
        self.strategies.insert(strategy.api(), strategy);
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, strategy: Arc<dyn ResourceDiscovery>) -> Self {
        self.register(strategy);
        self
    }

    /// Strategy for an API
    pub fn get(&self, api: ProviderApi) -> Result<Arc<dyn ResourceDiscovery>> {
        self.strategies.get(&api).cloned().ok_or_else(|| {
            Error::config(format!("No discovery strategy registered for {}", api))
        })
    }

    /// APIs with a registered strategy
    pub fn apis(&self) -> Vec<ProviderApi> {
        let mut apis: Vec<ProviderApi> = self.strategies.keys().copied().collect();
        apis.sort();
        apis
    }
}
