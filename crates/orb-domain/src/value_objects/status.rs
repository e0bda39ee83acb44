//! Request and machine lifecycle states

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::instance::InstanceState;
use crate::error::Error;

/// Request lifecycle state
///
/// `Pending` and `InProgress` are active; every other state is terminal and
/// has no outgoing transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// Persisted, provider call not yet completed
    Pending,
    /// Resources created, reconciliation ongoing
    InProgress,
    /// Requested capacity is running
    Completed,
    /// Unrecoverable provider error or vanished resource
    Failed,
    /// Reconciliation exceeded the request timeout
    Timeout,
    /// Cancelled by the caller
    Cancelled,
}

impl RequestStatus {
    /// Whether the state is terminal
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending | Self::InProgress)
    }

    /// Whether `self -> next` is an allowed transition
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        match (self, next) {
            (
                Self::Pending,
                Self::InProgress | Self::Failed | Self::Timeout | Self::Cancelled,
            ) => true,
            (
                Self::InProgress,
                Self::Completed | Self::Failed | Self::Timeout | Self::Cancelled,
            ) => true,
            _ => false,
        }
    }

    /// Canonical name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Timeout => "TIMEOUT",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            "TIMEOUT" => Ok(Self::Timeout),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(Error::invalid_argument(format!(
                "Unknown request status: {}",
                s
            ))),
        }
    }
}

/// Machine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    /// Launching
    Pending,
    /// Running
    Running,
    /// Being shut down
    Terminating,
    /// Gone
    Terminated,
    /// Failed to launch or crashed
    Failed,
}

impl MachineStatus {
    /// Canonical name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Terminating => "terminating",
            Self::Terminated => "terminated",
            Self::Failed => "failed",
        }
    }

    /// Whether the machine will never become running again
    pub fn is_final(self) -> bool {
        matches!(self, Self::Terminated | Self::Failed)
    }
}

impl From<InstanceState> for MachineStatus {
    fn from(state: InstanceState) -> Self {
        match state {
            InstanceState::Pending => Self::Pending,
            InstanceState::Running => Self::Running,
            InstanceState::ShuttingDown => Self::Terminating,
            InstanceState::Terminated => Self::Terminated,
            InstanceState::Failed => Self::Failed,
        }
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
