//! Configuration types module

pub mod app;
pub mod logging;
pub mod provider;
pub mod reconciliation;
pub mod resilience;
pub mod selection;

// Re-export main types
pub use app::*;
pub use logging::LoggingConfig;
pub use provider::{CapabilitiesConfig, ProviderConfig};
pub use reconciliation::ReconciliationConfig;
pub use resilience::ResilienceConfig;
pub use selection::{SelectionConfig, ValidationConfig};
