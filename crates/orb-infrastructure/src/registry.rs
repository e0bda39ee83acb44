//! Provider Registry
//!
//! Config-derived catalog of provider instances and the adapters serving
//! them. The whole state is swapped atomically on reload, so readers always
//! see one consistent configuration.
//!
//! ```text
//! [[providers]] ──resolve_provider_adapter──▶ adapter ──capabilities()──┐
//!       │                                                              ▼
//!       └──────────────────────────────────────────────▶ ProviderInstance
//!                                                      (+ breaker health)
//! ```
//!
//! Adapters of instances dropped by a reload stay resolvable: requests bound
//! to them before the reload can still be reconciled and cleaned up.

use crate::config::ProviderConfig;
use crate::resilience::CircuitBreakerRegistry;
use arc_swap::ArcSwap;
use orb_application::ports::ProviderCatalog;
use orb_application::ports::registry::resolve_provider_adapter;
use orb_domain::entities::ProviderInstance;
use orb_domain::error::{Error, Result};
use orb_domain::ports::ProviderAdapter;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// One configured instance and its adapter
#[derive(Clone)]
struct RegistryEntry {
    config: Option<ProviderConfig>,
    instance: ProviderInstance,
    adapter: Arc<dyn ProviderAdapter>,
}

#[derive(Default)]
struct RegistryState {
    /// Configured instances in configuration order
    active: Vec<RegistryEntry>,
    /// Adapters of instances removed by earlier reloads
    retired: HashMap<String, Arc<dyn ProviderAdapter>>,
}

impl RegistryState {
    fn find(&self, name: &str) -> Option<&RegistryEntry> {
        self.active.iter().find(|e| e.instance.name == name)
    }
}

/// Registry of configured provider instances
pub struct ProviderRegistry {
    state: ArcSwap<RegistryState>,
    breakers: Option<Arc<CircuitBreakerRegistry>>,
}

impl ProviderRegistry {
    /// Build the registry from configuration, resolving every adapter
    pub fn from_config(
        providers: &[ProviderConfig],
        breakers: Option<Arc<CircuitBreakerRegistry>>,
    ) -> Result<Self> {
        let registry = Self {
            state: ArcSwap::from_pointee(RegistryState::default()),
            breakers,
        };
        registry.reload(providers)?;
        Ok(registry)
    }

    /// Build the registry from ready instances and adapters
    ///
    /// Every instance needs an adapter with the same name.
    pub fn from_parts(
        instances: Vec<ProviderInstance>,
        adapters: Vec<Arc<dyn ProviderAdapter>>,
        breakers: Option<Arc<CircuitBreakerRegistry>>,
    ) -> Result<Self> {
        let mut by_name: HashMap<String, Arc<dyn ProviderAdapter>> = adapters
            .into_iter()
            .map(|a| (a.provider_name().to_string(), a))
            .collect();
        let active = instances
            .into_iter()
            .map(|instance| {
                let adapter = by_name.remove(&instance.name).ok_or_else(|| {
                    Error::config(format!("No adapter for provider '{}'", instance.name))
                })?;
                Ok(RegistryEntry {
                    config: None,
                    instance,
                    adapter,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            state: ArcSwap::from_pointee(RegistryState {
                active,
                retired: HashMap::new(),
            }),
            breakers,
        })
    }

    /// Replace the configured instances
    ///
    /// Instances whose adapter settings are unchanged keep their adapter.
    /// Fails without touching the current state if any adapter cannot be
    /// resolved.
    pub fn reload(&self, providers: &[ProviderConfig]) -> Result<()> {
        let current = self.state.load_full();
        let mut active = Vec::with_capacity(providers.len());

        for config in providers {
            let reused = current.find(&config.name).and_then(|entry| {
                entry
                    .config
                    .as_ref()
                    .filter(|old| same_adapter(old, config))
                    .map(|_| entry.adapter.clone())
            });
            let adapter = match reused {
                Some(adapter) => adapter,
                None => resolve_provider_adapter(&config.adapter_config()).map_err(|e| {
                    Error::config(format!("Provider '{}': {}", config.name, e))
                })?,
            };
            let instance = config.to_instance(&adapter.capabilities());
            debug!(
                provider = %instance.name,
                adapter = %config.adapter,
                enabled = instance.enabled,
                "Registered provider instance"
            );
            active.push(RegistryEntry {
                config: Some(config.clone()),
                instance,
                adapter,
            });
        }

        let mut retired = current.retired.clone();
        for old in &current.active {
            let kept = active.iter().any(|e| e.instance.name == old.instance.name);
            if !kept {
                retired.insert(old.instance.name.clone(), old.adapter.clone());
            }
        }
        // A re-added name resolves to its new adapter
        for entry in &active {
            retired.remove(&entry.instance.name);
        }

        info!(
            providers = active.len(),
            retired = retired.len(),
            "Provider registry loaded"
        );
        self.state.store(Arc::new(RegistryState { active, retired }));
        Ok(())
    }

    /// Adapter serving a provider instance, including instances removed by a reload
    pub fn adapter(&self, name: &str) -> Result<Arc<dyn ProviderAdapter>> {
        let state = self.state.load();
        if let Some(entry) = state.find(name) {
            return Ok(entry.adapter.clone());
        }
        state
            .retired
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("provider instance '{}'", name)))
    }

    /// Names of configured instances in configuration order
    pub fn names(&self) -> Vec<String> {
        self.state
            .load()
            .active
            .iter()
            .map(|e| e.instance.name.clone())
            .collect()
    }

    /// Number of configured instances
    pub fn len(&self) -> usize {
        self.state.load().active.len()
    }

    /// Whether no instance is configured
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn same_adapter(old: &ProviderConfig, new: &ProviderConfig) -> bool {
    old.adapter == new.adapter
        && old.provider_type == new.provider_type
        && old.capabilities == new.capabilities
        && old.extra == new.extra
}

impl ProviderCatalog for ProviderRegistry {
    fn snapshot(&self) -> Arc<Vec<ProviderInstance>> {
        let state = self.state.load();
        let instances = state
            .active
            .iter()
            .map(|entry| match &self.breakers {
                Some(breakers) => entry
                    .instance
                    .clone()
                    .with_health(breakers.health(&entry.instance.name)),
                None => entry.instance.clone(),
            })
            .collect();
        Arc::new(instances)
    }
}
