//! Provider-side resources and instances

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::provider_api::{FleetType, ProviderApi};

/// Opaque provider-side identifier returned by `create`
///
/// `id` is a fleet id, spot-fleet request id, group name or reservation id
/// depending on `api`. APIs that report instance ids synchronously
/// (RunInstances, instant fleets) carry them in `instance_ids`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandle {
    /// Provider-side resource identifier
    pub id: String,
    /// API the resource was created with
    pub api: ProviderApi,
    /// Fleet sub-type, for fleet-based APIs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fleet_type: Option<FleetType>,
    /// Instance ids returned with the creation response
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instance_ids: Vec<String>,
}

impl ResourceHandle {
    /// Create a handle without creation-time instance ids
    pub fn new<S: Into<String>>(id: S, api: ProviderApi) -> Self {
        Self {
            id: id.into(),
            api,
            fleet_type: None,
            instance_ids: Vec::new(),
        }
    }

    /// Set the fleet sub-type
    pub fn with_fleet_type(mut self, fleet_type: FleetType) -> Self {
        self.fleet_type = Some(fleet_type);
        self
    }

    /// Attach creation-time instance ids
    pub fn with_instance_ids(mut self, ids: Vec<String>) -> Self {
        self.instance_ids = ids;
        self
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Current membership of an asynchronous resource (fleet, spot fleet, group)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// Instance ids currently belonging to the resource
    pub instance_ids: Vec<String>,
    /// Whether the provider has finished adding capacity
    pub fulfilled: bool,
}

/// Provider-reported instance lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstanceState {
    /// Launch in progress
    Pending,
    /// Running and reachable
    Running,
    /// Stopping or shutting down
    ShuttingDown,
    /// Gone
    Terminated,
    /// Launch or runtime failure reported by the provider
    Failed,
}

impl InstanceState {
    /// Canonical name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::ShuttingDown => "shutting-down",
            Self::Terminated => "terminated",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One instance as described by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDescriptor {
    /// Provider-assigned instance id
    pub instance_id: String,
    /// Current lifecycle state
    pub state: InstanceState,
    /// Private address, once assigned
    pub private_ip: Option<String>,
    /// Public address, if any
    pub public_ip: Option<String>,
    /// Launch time reported by the provider
    pub launched_at: Option<DateTime<Utc>>,
}

impl InstanceDescriptor {
    /// Create a descriptor without addresses
    pub fn new<S: Into<String>>(instance_id: S, state: InstanceState) -> Self {
        Self {
            instance_id: instance_id.into(),
            state,
            private_ip: None,
            public_ip: None,
            launched_at: None,
        }
    }

    /// Set the private address
    pub fn with_private_ip<S: Into<String>>(mut self, ip: S) -> Self {
        self.private_ip = Some(ip.into());
        self
    }

    /// Set the public address
    pub fn with_public_ip<S: Into<String>>(mut self, ip: S) -> Self {
        self.public_ip = Some(ip.into());
        self
    }
}
