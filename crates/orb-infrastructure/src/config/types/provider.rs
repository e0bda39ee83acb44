//! Provider instance configuration types

use orb_application::ports::registry::ProviderAdapterConfig;
use orb_domain::constants::{PROVIDER_DEFAULT_PRIORITY, PROVIDER_DEFAULT_WEIGHT};
use orb_domain::entities::{ProviderCapabilities, ProviderInstance};
use orb_domain::value_objects::{FleetType, PricingModel, ProviderApi};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

fn default_adapter() -> String {
    "in_memory".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_priority() -> u32 {
    PROVIDER_DEFAULT_PRIORITY
}

fn default_weight() -> u32 {
    PROVIDER_DEFAULT_WEIGHT
}

/// One configured provider instance
///
/// ```toml
/// [[providers]]
/// name = "aws-east"
/// provider_type = "aws"
/// adapter = "in_memory"
/// priority = 1
/// weight = 3
///
/// [providers.capabilities]
/// supported_apis = ["EC2Fleet", "SpotFleet"]
/// max_instances_per_request = 500
///
/// [providers.extra]
/// fulfillment = "manual"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Unique instance name
    pub name: String,

    /// Provider type (e.g. "aws")
    pub provider_type: String,

    /// Registered adapter serving the instance
    #[serde(default = "default_adapter")]
    pub adapter: String,

    /// Whether the instance may be selected
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Selection priority, lower is preferred
    #[serde(default = "default_priority")]
    pub priority: u32,

    /// Relative share for weighted selection
    #[serde(default = "default_weight")]
    pub weight: u32,

    /// Capability overrides; unset fields come from the adapter
    #[serde(default)]
    pub capabilities: Option<CapabilitiesConfig>,

    /// Adapter-specific settings
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

impl ProviderConfig {
    /// Enabled instance with default adapter, priority and weight
    pub fn new(name: impl Into<String>, provider_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider_type: provider_type.into(),
            adapter: default_adapter(),
            enabled: true,
            priority: PROVIDER_DEFAULT_PRIORITY,
            weight: PROVIDER_DEFAULT_WEIGHT,
            capabilities: None,
            extra: HashMap::new(),
        }
    }

    /// Set the adapter name
    pub fn with_adapter(mut self, adapter: impl Into<String>) -> Self {
        self.adapter = adapter.into();
        self
    }

    /// Set the enabled flag
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the weight
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    /// Set capability overrides
    pub fn with_capabilities(mut self, capabilities: CapabilitiesConfig) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Add an adapter setting
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Adapter factory input for this instance
    pub fn adapter_config(&self) -> ProviderAdapterConfig {
        ProviderAdapterConfig {
            adapter: self.adapter.clone(),
            instance_name: self.name.clone(),
            provider_type: self.provider_type.clone(),
            capabilities: self
                .capabilities
                .as_ref()
                .map(|c| c.resolve(&ProviderCapabilities::all())),
            extra: self.extra.clone(),
        }
    }

    /// Registry entry for this instance given the adapter's advertised capabilities
    pub fn to_instance(&self, advertised: &ProviderCapabilities) -> ProviderInstance {
        let capabilities = match &self.capabilities {
            Some(overrides) => overrides.resolve(advertised),
            None => advertised.clone(),
        };
        ProviderInstance::new(&self.name, &self.provider_type)
            .with_enabled(self.enabled)
            .with_priority(self.priority)
            .with_weight(self.weight)
            .with_capabilities(capabilities)
    }
}

/// Partial capability set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilitiesConfig {
    /// Provisioning APIs the instance serves
    pub supported_apis: Option<BTreeSet<ProviderApi>>,

    /// Maximum instances in a single create call
    pub max_instances_per_request: Option<u32>,

    /// Supported pricing models
    pub supported_pricing_models: Option<BTreeSet<PricingModel>>,

    /// Supported fleet sub-types
    pub supported_fleet_types: Option<BTreeSet<FleetType>>,
}

impl CapabilitiesConfig {
    /// Restrict to the given APIs
    pub fn with_apis<I: IntoIterator<Item = ProviderApi>>(mut self, apis: I) -> Self {
        self.supported_apis = Some(apis.into_iter().collect());
        self
    }

    /// Set the per-request instance limit
    pub fn with_max_instances(mut self, max: u32) -> Self {
        self.max_instances_per_request = Some(max);
        self
    }

    /// Fill unset fields from `base`
    pub fn resolve(&self, base: &ProviderCapabilities) -> ProviderCapabilities {
        ProviderCapabilities {
            supported_apis: self
                .supported_apis
                .clone()
                .unwrap_or_else(|| base.supported_apis.clone()),
            max_instances_per_request: self
                .max_instances_per_request
                .unwrap_or(base.max_instances_per_request),
            supported_pricing_models: self
                .supported_pricing_models
                .clone()
                .unwrap_or_else(|| base.supported_pricing_models.clone()),
            supported_fleet_types: self
                .supported_fleet_types
                .clone()
                .unwrap_or_else(|| base.supported_fleet_types.clone()),
        }
    }
}
