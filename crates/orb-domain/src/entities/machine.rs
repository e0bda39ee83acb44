//! Machine entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{InstanceDescriptor, MachineStatus, RequestId};

/// One concrete provisioned instance belonging to a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    /// Provider-assigned instance id
    pub machine_id: String,
    /// Owning request
    pub request_id: RequestId,
    /// Resource handle the instance was discovered through
    pub resource_handle: String,
    /// Provider instance hosting the machine
    pub provider_name: String,
    /// Lifecycle state
    pub status: MachineStatus,
    /// Private address
    pub private_ip: Option<String>,
    /// Public address
    pub public_ip: Option<String>,
    /// First time the machine was recorded
    pub created_at: DateTime<Utc>,
    /// Last refresh
    pub updated_at: DateTime<Utc>,
    /// Storage version
    pub version: u64,
}

impl Machine {
    /// Build a machine record from a provider descriptor
    pub fn from_descriptor(
        request_id: &RequestId,
        resource_handle: &str,
        provider_name: &str,
        descriptor: &InstanceDescriptor,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            machine_id: descriptor.instance_id.clone(),
            request_id: request_id.clone(),
            resource_handle: resource_handle.to_string(),
            provider_name: provider_name.to_string(),
            status: descriptor.state.into(),
            private_ip: descriptor.private_ip.clone(),
            public_ip: descriptor.public_ip.clone(),
            created_at: descriptor.launched_at.unwrap_or(now),
            updated_at: now,
            version: 0,
        }
    }

    /// Refresh from a newer descriptor; returns `true` if anything changed
    pub fn apply_descriptor(&mut self, descriptor: &InstanceDescriptor, now: DateTime<Utc>) -> bool {
        let status = MachineStatus::from(descriptor.state);
        let changed = self.status != status
            || self.private_ip != descriptor.private_ip
            || self.public_ip != descriptor.public_ip;
        if changed {
            self.status = status;
            self.private_ip = descriptor.private_ip.clone();
            self.public_ip = descriptor.public_ip.clone();
            self.updated_at = now;
        }
        changed
    }

    /// Whether the machine is running
    pub fn is_running(&self) -> bool {
        self.status == MachineStatus::Running
    }
}
