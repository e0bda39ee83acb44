//! Provider health

use serde::{Deserialize, Serialize};

/// Health status for a provider instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderHealthStatus {
    /// Provider is functioning normally
    #[default]
    Healthy,
    /// Provider is recovering and accepts a limited number of calls
    Degraded,
    /// Provider is rejecting calls
    Unhealthy,
}

impl ProviderHealthStatus {
    /// Sort key where healthier providers come first
    pub fn rank(self) -> u8 {
        match self {
            Self::Healthy => 0,
            Self::Degraded => 1,
            Self::Unhealthy => 2,
        }
    }
}
