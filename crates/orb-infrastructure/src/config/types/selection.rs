//! Selection and validation configuration types

use orb_domain::value_objects::{SelectionPolicy, ValidationLevel};
use serde::{Deserialize, Serialize};

/// Provider selection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Policy applied when a template does not pin an instance
    pub policy: SelectionPolicy,

    /// Instance used for templates without provider hints
    pub default_provider: Option<String>,

    /// Seed for the weighted draw; unseeded draws use the thread RNG
    pub seed: Option<u64>,
}

/// Capability validation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Strictness level (strict, lenient, basic)
    pub level: ValidationLevel,
}
