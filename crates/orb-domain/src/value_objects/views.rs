//! Read models and query filters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MachineStatus, ProviderApi, RequestId, RequestStatus};
use crate::entities::{Machine, Request};

/// Machine as seen by front ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineView {
    /// Provider-assigned instance id
    pub machine_id: String,
    /// Lifecycle state
    pub status: MachineStatus,
    /// Private address
    pub private_ip: Option<String>,
    /// Public address
    pub public_ip: Option<String>,
    /// Resource handle the machine belongs to
    pub resource_handle: String,
    /// First time the machine was recorded
    pub created_at: DateTime<Utc>,
}

impl From<&Machine> for MachineView {
    fn from(machine: &Machine) -> Self {
        Self {
            machine_id: machine.machine_id.clone(),
            status: machine.status,
            private_ip: machine.private_ip.clone(),
            public_ip: machine.public_ip.clone(),
            resource_handle: machine.resource_handle.clone(),
            created_at: machine.created_at,
        }
    }
}

/// Request as seen by front ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestView {
    /// Request identifier
    pub request_id: RequestId,
    /// Template identifier
    pub template_id: String,
    /// Lifecycle state
    pub status: RequestStatus,
    /// Provisioning API
    pub provider_api: ProviderApi,
    /// Bound provider type
    pub provider_type: Option<String>,
    /// Bound provider instance
    pub provider_name: Option<String>,
    /// Instances requested
    pub requested_count: u32,
    /// Machines currently running
    pub running_count: u32,
    /// Provider resource handles
    pub resource_handles: Vec<String>,
    /// Machines recorded for the request
    pub machines: Vec<MachineView>,
    /// Last observed error
    pub last_error: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    /// Time a terminal state was reached
    pub completed_at: Option<DateTime<Utc>>,
}

impl RequestView {
    /// Assemble a view from a request and its machines
    pub fn new(request: &Request, machines: &[Machine]) -> Self {
        let running_count = machines.iter().filter(|m| m.is_running()).count();
        Self {
            request_id: request.request_id.clone(),
            template_id: request.template_id.clone(),
            status: request.status,
            provider_api: request.provider_api,
            provider_type: request.provider_type.clone(),
            provider_name: request.provider_name.clone(),
            requested_count: request.requested_count,
            running_count: u32::try_from(running_count).unwrap_or(u32::MAX),
            resource_handles: request.handle_ids(),
            machines: machines.iter().map(MachineView::from).collect(),
            last_error: request.last_error.clone(),
            created_at: request.created_at,
            updated_at: request.updated_at,
            completed_at: request.completed_at,
        }
    }
}

/// Filter for listing requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFilter {
    /// Match any of these states (all states when empty)
    #[serde(default)]
    pub statuses: Vec<RequestStatus>,
    /// Match this template
    #[serde(default)]
    pub template_id: Option<String>,
    /// Match this provider instance
    #[serde(default)]
    pub provider_name: Option<String>,
    /// Maximum number of results
    #[serde(default)]
    pub limit: Option<usize>,
}

impl RequestFilter {
    /// Filter matching every request
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter matching active (non-terminal) requests
    pub fn active() -> Self {
        Self {
            statuses: vec![RequestStatus::Pending, RequestStatus::InProgress],
            ..Self::default()
        }
    }

    /// Restrict to the given states
    pub fn with_statuses<I: IntoIterator<Item = RequestStatus>>(mut self, statuses: I) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    /// Restrict to a template
    pub fn with_template<S: Into<String>>(mut self, template_id: S) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    /// Restrict to a provider instance
    pub fn with_provider<S: Into<String>>(mut self, provider_name: S) -> Self {
        self.provider_name = Some(provider_name.into());
        self
    }

    /// Cap the number of results
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a request satisfies the filter (ignores `limit`)
    pub fn matches(&self, request: &Request) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&request.status) {
            return false;
        }
        if let Some(template_id) = &self.template_id {
            if &request.template_id != template_id {
                return false;
            }
        }
        if let Some(provider) = &self.provider_name {
            if request.provider_name.as_ref() != Some(provider) {
                return false;
            }
        }
        true
    }
}
