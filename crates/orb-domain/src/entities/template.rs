//! Template entity

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::TEMPLATE_DEFAULT_INSTANCE_COUNT;
use crate::value_objects::{FleetType, PricingModel, ProviderApi};

/// Named provisioning intent
///
/// Provider hints drive selection: `provider_name` pins one instance,
/// `provider_type` restricts to a type, `provider_api` restricts to
/// instances advertising that API. `attributes` (image, networking, tags)
/// is passed through to adapters without interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Template identifier
    pub template_id: String,
    /// Provider type hint (e.g. "aws")
    #[serde(default)]
    pub provider_type: Option<String>,
    /// Provider instance name hint
    #[serde(default)]
    pub provider_name: Option<String>,
    /// Provisioning API
    #[serde(default)]
    pub provider_api: Option<ProviderApi>,
    /// Default number of instances
    #[serde(default = "default_instance_count")]
    pub instance_count: u32,
    /// Requested pricing model
    #[serde(default)]
    pub pricing_model: Option<PricingModel>,
    /// Requested fleet sub-type
    #[serde(default)]
    pub fleet_type: Option<FleetType>,
    /// Opaque adapter attributes
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
    /// Storage version
    #[serde(default)]
    pub version: u64,
}

fn default_instance_count() -> u32 {
    TEMPLATE_DEFAULT_INSTANCE_COUNT
}

impl Template {
    /// Create a template with no hints
    pub fn new<S: Into<String>>(template_id: S) -> Self {
        Self {
            template_id: template_id.into(),
            provider_type: None,
            provider_name: None,
            provider_api: None,
            instance_count: TEMPLATE_DEFAULT_INSTANCE_COUNT,
            pricing_model: None,
            fleet_type: None,
            attributes: BTreeMap::new(),
            version: 0,
        }
    }

    /// Pin a provider instance
    pub fn with_provider_name<S: Into<String>>(mut self, name: S) -> Self {
        self.provider_name = Some(name.into());
        self
    }

    /// Restrict to a provider type
    pub fn with_provider_type<S: Into<String>>(mut self, provider_type: S) -> Self {
        self.provider_type = Some(provider_type.into());
        self
    }

    /// Set the provisioning API
    pub fn with_provider_api(mut self, api: ProviderApi) -> Self {
        self.provider_api = Some(api);
        self
    }

    /// Set the default instance count
    pub fn with_instance_count(mut self, count: u32) -> Self {
        self.instance_count = count;
        self
    }

    /// Set the pricing model
    pub fn with_pricing_model(mut self, model: PricingModel) -> Self {
        self.pricing_model = Some(model);
        self
    }

    /// Set the fleet sub-type
    pub fn with_fleet_type(mut self, fleet_type: FleetType) -> Self {
        self.fleet_type = Some(fleet_type);
        self
    }

    /// Add an opaque attribute
    pub fn with_attribute<K: Into<String>>(mut self, key: K, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// API to provision with, RunInstances when unspecified
    pub fn effective_api(&self) -> ProviderApi {
        self.provider_api.unwrap_or(ProviderApi::RunInstances)
    }
}
