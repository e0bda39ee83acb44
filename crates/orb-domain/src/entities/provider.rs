//! Provider instance entity

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::constants::{
    PROVIDER_DEFAULT_MAX_INSTANCES_PER_REQUEST, PROVIDER_DEFAULT_PRIORITY,
    PROVIDER_DEFAULT_WEIGHT,
};
use crate::value_objects::{FleetType, PricingModel, ProviderApi, ProviderHealthStatus};

/// Features a provider instance advertises
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    /// Provisioning APIs the instance can serve
    pub supported_apis: BTreeSet<ProviderApi>,
    /// Maximum instances in a single create call
    pub max_instances_per_request: u32,
    /// Supported pricing models
    pub supported_pricing_models: BTreeSet<PricingModel>,
    /// Supported fleet sub-types
    pub supported_fleet_types: BTreeSet<FleetType>,
}

impl ProviderCapabilities {
    /// Capability set supporting every API, pricing model and fleet sub-type
    pub fn all() -> Self {
        Self {
            supported_apis: ProviderApi::ALL.into_iter().collect(),
            max_instances_per_request: PROVIDER_DEFAULT_MAX_INSTANCES_PER_REQUEST,
            supported_pricing_models: [
                PricingModel::OnDemand,
                PricingModel::Spot,
                PricingModel::Heterogeneous,
            ]
            .into_iter()
            .collect(),
            supported_fleet_types: [FleetType::Instant, FleetType::Request, FleetType::Maintain]
                .into_iter()
                .collect(),
        }
    }

    /// Capability set for the given APIs with default limits
    pub fn for_apis<I: IntoIterator<Item = ProviderApi>>(apis: I) -> Self {
        Self {
            supported_apis: apis.into_iter().collect(),
            ..Self::all()
        }
    }

    /// Set the per-request instance limit
    pub fn with_max_instances(mut self, max: u32) -> Self {
        self.max_instances_per_request = max;
        self
    }

    /// Replace the supported pricing models
    pub fn with_pricing_models<I: IntoIterator<Item = PricingModel>>(mut self, models: I) -> Self {
        self.supported_pricing_models = models.into_iter().collect();
        self
    }

    /// Replace the supported fleet sub-types
    pub fn with_fleet_types<I: IntoIterator<Item = FleetType>>(mut self, types: I) -> Self {
        self.supported_fleet_types = types.into_iter().collect();
        self
    }

    /// Whether the API is supported
    pub fn supports_api(&self, api: ProviderApi) -> bool {
        self.supported_apis.contains(&api)
    }

    /// Whether the pricing model is supported
    pub fn supports_pricing_model(&self, model: PricingModel) -> bool {
        self.supported_pricing_models.contains(&model)
    }

    /// Whether the fleet sub-type is supported
    pub fn supports_fleet_type(&self, fleet_type: FleetType) -> bool {
        self.supported_fleet_types.contains(&fleet_type)
    }
}

impl Default for ProviderCapabilities {
    fn default() -> Self {
        Self::all()
    }
}

/// Configured provider endpoint
///
/// Loaded at startup or config reload; request processing never creates
/// or removes instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderInstance {
    /// Unique instance name
    pub name: String,
    /// Provider type (e.g. "aws")
    pub provider_type: String,
    /// Whether the instance may be selected
    pub enabled: bool,
    /// Selection priority, lower is preferred
    pub priority: u32,
    /// Relative share for weighted selection
    pub weight: u32,
    /// Advertised capabilities
    pub capabilities: ProviderCapabilities,
    /// Health derived from the instance's circuit breaker
    #[serde(default)]
    pub health: ProviderHealthStatus,
}

impl ProviderInstance {
    /// Create an enabled instance with default priority, weight and capabilities
    pub fn new<N: Into<String>, T: Into<String>>(name: N, provider_type: T) -> Self {
        Self {
            name: name.into(),
            provider_type: provider_type.into(),
            enabled: true,
            priority: PROVIDER_DEFAULT_PRIORITY,
            weight: PROVIDER_DEFAULT_WEIGHT,
            capabilities: ProviderCapabilities::all(),
            health: ProviderHealthStatus::Healthy,
        }
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

    /// Set the enabled flag
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Replace the capability set
    pub fn with_capabilities(mut self, capabilities: ProviderCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the health status
    pub fn with_health(mut self, health: ProviderHealthStatus) -> Self {
        self.health = health;
        self
    }
}
