//! Provider Catalog Port

use orb_domain::entities::ProviderInstance;
use std::sync::Arc;

/// Read access to the configured provider instances
///
/// Implementations return immutable snapshots; a config reload swaps the
/// snapshot without disturbing holders of the previous one.
pub trait ProviderCatalog: Send + Sync {
    /// All provider instances in configuration order
    fn snapshot(&self) -> Arc<Vec<ProviderInstance>>;

    /// One provider instance by name
    fn get(&self, name: &str) -> Option<ProviderInstance> {
        self.snapshot().iter().find(|p| p.name == name).cloned()
    }
}
