//! Main application configuration

use orb_domain::entities::Template;
use serde::{Deserialize, Serialize};

pub use super::logging::LoggingConfig;
pub use super::provider::ProviderConfig;
pub use super::reconciliation::ReconciliationConfig;
pub use super::resilience::ResilienceConfig;
pub use super::selection::{SelectionConfig, ValidationConfig};

/// Main application configuration
///
/// Every section has defaults, so a file only needs the values it changes.
/// The default provider list holds one simulated instance so the broker
/// starts without a configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Provider selection
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Capability validation
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Retry, circuit breaker and concurrency bounds
    #[serde(default)]
    pub resilience: ResilienceConfig,

    /// Reconciliation scheduling and request lifecycle
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,

    /// Provider instances in configuration order
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,

    /// Templates seeded into storage at startup
    #[serde(default)]
    pub templates: Vec<Template>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            selection: SelectionConfig::default(),
            validation: ValidationConfig::default(),
            resilience: ResilienceConfig::default(),
            reconciliation: ReconciliationConfig::default(),
            providers: vec![ProviderConfig::new("local", "simulated")],
            templates: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Provider configuration by instance name
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }
}
