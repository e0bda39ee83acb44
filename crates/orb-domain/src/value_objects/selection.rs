//! Provider selection policies and results

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Strategy used to pick one provider instance among eligible candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Templates must name a provider instance (or a default must be configured)
    Explicit,
    /// Weighted random draw proportional to instance weight
    WeightedRoundRobin,
    /// Lowest priority value wins, ties broken by name
    Priority,
    /// Best capability match for the template wins
    CapabilityBased,
    /// First enabled instance in configuration order
    #[default]
    Default,
}

impl SelectionPolicy {
    /// Canonical name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::WeightedRoundRobin => "weighted_round_robin",
            Self::Priority => "priority",
            Self::CapabilityBased => "capability_based",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "explicit" => Ok(Self::Explicit),
            "weighted_round_robin" | "weighted" => Ok(Self::WeightedRoundRobin),
            "priority" => Ok(Self::Priority),
            "capability_based" | "capability" => Ok(Self::CapabilityBased),
            "default" | "first_available" => Ok(Self::Default),
            _ => Err(Error::invalid_argument(format!(
                "Unknown selection policy: {}",
                s
            ))),
        }
    }
}

/// Outcome of provider selection
///
/// Not persisted beyond the owning request; `alternatives` is the ordered
/// fallback list handed to the resilient invoker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSelectionResult {
    /// Chosen provider instance name
    pub provider_name: String,
    /// Chosen provider type
    pub provider_type: String,
    /// Policy that produced the choice
    pub policy: SelectionPolicy,
    /// Human-readable reason
    pub reason: String,
    /// Confidence score in `[0, 1]`
    pub confidence: f64,
    /// Alternative instance names, most preferred first
    pub alternatives: Vec<String>,
}

impl ProviderSelectionResult {
    /// Every candidate in invocation order: the choice, then alternatives
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.provider_name.as_str())
            .chain(self.alternatives.iter().map(String::as_str))
    }
}
