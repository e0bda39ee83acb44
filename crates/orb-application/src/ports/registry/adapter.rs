//! Provider Adapter Registry
//!
//! Adapters register a factory into [`PROVIDER_ADAPTERS`]; the composition
//! root resolves each configured provider instance's adapter by name.

use std::collections::HashMap;
use std::sync::Arc;

use orb_domain::entities::ProviderCapabilities;
use orb_domain::ports::ProviderAdapter;

/// Configuration for adapter creation
///
/// Adapters use what they need and ignore the rest.
#[derive(Debug, Clone, Default)]
pub struct ProviderAdapterConfig {
    /// Adapter name (e.g. "in_memory", "null")
    pub adapter: String,
    /// Provider instance the adapter will serve
    pub instance_name: String,
    /// Provider type of that instance
    pub provider_type: String,
    /// Capabilities configured for the instance, if any
    pub capabilities: Option<ProviderCapabilities>,
    /// Additional adapter-specific settings
    pub extra: HashMap<String, String>,
}

impl ProviderAdapterConfig {
    /// Create a config for the given adapter and instance
    pub fn new(adapter: impl Into<String>, instance_name: impl Into<String>) -> Self {
        Self {
            adapter: adapter.into(),
            instance_name: instance_name.into(),
            ..Default::default()
        }
    }

    /// Set the provider type
    pub fn with_provider_type(mut self, provider_type: impl Into<String>) -> Self {
        self.provider_type = provider_type.into();
        self
    }

    /// Set configured capabilities
    pub fn with_capabilities(mut self, capabilities: ProviderCapabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Add extra configuration
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Registry entry for provider adapters
pub struct ProviderAdapterEntry {
    /// Unique adapter name
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function creating an adapter for one provider instance
    pub factory: fn(&ProviderAdapterConfig) -> Result<Arc<dyn ProviderAdapter>, String>,
}

#[linkme::distributed_slice]
pub static PROVIDER_ADAPTERS: [ProviderAdapterEntry] = [..];

/// Resolve an adapter by name from the registry
///
/// # Returns
/// * `Ok(Arc<dyn ProviderAdapter>)` - Created adapter
/// * `Err(String)` - Unknown adapter (with the list of available ones) or
///   factory failure
pub fn resolve_provider_adapter(
    config: &ProviderAdapterConfig,
) -> Result<Arc<dyn ProviderAdapter>, String> {
    if let Some(entry) = PROVIDER_ADAPTERS.iter().find(|e| e.name == config.adapter) {
        return (entry.factory)(config);
    }

    let available: Vec<&str> = PROVIDER_ADAPTERS.iter().map(|e| e.name).collect();
    Err(format!(
        "Unknown provider adapter '{}'. Available adapters: {:?}",
        config.adapter, available
    ))
}

/// List all registered adapters as (name, description)
pub fn list_provider_adapters() -> Vec<(&'static str, &'static str)> {
    PROVIDER_ADAPTERS
        .iter()
        .map(|e| (e.name, e.description))
        .collect()
}
