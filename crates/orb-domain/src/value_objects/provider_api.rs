//! Provisioning API variants
//!
//! A template names the provider API used to create capacity. Each variant
//! has its own creation and discovery semantics; fleet-based variants
//! additionally carry a sub-type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Provider API used to create capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderApi {
    /// Direct instance creation; instance ids known at creation time
    RunInstances,
    /// Fleet API (instant, request or maintain sub-type)
    EC2Fleet,
    /// Spot fleet request (request or maintain sub-type)
    SpotFleet,
    /// Auto-scaling group, identified by group name
    ASG,
}

impl ProviderApi {
    /// All variants in a stable order
    pub const ALL: [ProviderApi; 4] = [
        ProviderApi::RunInstances,
        ProviderApi::EC2Fleet,
        ProviderApi::SpotFleet,
        ProviderApi::ASG,
    ];

    /// Canonical name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RunInstances => "RunInstances",
            Self::EC2Fleet => "EC2Fleet",
            Self::SpotFleet => "SpotFleet",
            Self::ASG => "ASG",
        }
    }

    /// Whether the variant is parameterized by a fleet sub-type
    pub fn uses_fleet_type(self) -> bool {
        matches!(self, Self::EC2Fleet | Self::SpotFleet)
    }

    /// Whether the variant accepts the given fleet sub-type
    pub fn accepts_fleet_type(self, fleet_type: FleetType) -> bool {
        match self {
            Self::EC2Fleet => true,
            Self::SpotFleet => fleet_type != FleetType::Instant,
            Self::RunInstances | Self::ASG => false,
        }
    }
}

impl fmt::Display for ProviderApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderApi {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "runinstances" | "run_instances" => Ok(Self::RunInstances),
            "ec2fleet" | "ec2_fleet" | "fleet" => Ok(Self::EC2Fleet),
            "spotfleet" | "spot_fleet" => Ok(Self::SpotFleet),
            "asg" | "autoscaling" | "auto_scaling_group" => Ok(Self::ASG),
            _ => Err(Error::invalid_argument(format!(
                "Unknown provider API: {}",
                s
            ))),
        }
    }
}

/// Fleet sub-type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FleetType {
    /// Synchronous fleet; instance ids returned with the creation response
    Instant,
    /// One-shot asynchronous fleet
    Request,
    /// Asynchronous fleet that keeps target capacity
    Maintain,
}

impl FleetType {
    /// Canonical name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Instant => "instant",
            Self::Request => "request",
            Self::Maintain => "maintain",
        }
    }
}

impl fmt::Display for FleetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FleetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "instant" => Ok(Self::Instant),
            "request" => Ok(Self::Request),
            "maintain" => Ok(Self::Maintain),
            _ => Err(Error::invalid_argument(format!(
                "Unknown fleet type: {}",
                s
            ))),
        }
    }
}

/// Pricing model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingModel {
    /// On-demand capacity
    OnDemand,
    /// Spot capacity
    Spot,
    /// Mix of on-demand and spot capacity
    Heterogeneous,
}

impl PricingModel {
    /// Canonical name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnDemand => "ondemand",
            Self::Spot => "spot",
            Self::Heterogeneous => "heterogeneous",
        }
    }
}

impl fmt::Display for PricingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PricingModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ondemand" | "on_demand" | "on-demand" => Ok(Self::OnDemand),
            "spot" => Ok(Self::Spot),
            "heterogeneous" | "mixed" => Ok(Self::Heterogeneous),
            _ => Err(Error::invalid_argument(format!(
                "Unknown pricing model: {}",
                s
            ))),
        }
    }
}
