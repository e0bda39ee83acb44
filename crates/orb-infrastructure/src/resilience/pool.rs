//! Per-provider concurrency bound
//!
//! Each provider instance gets its own semaphore, so a slow provider only
//! exhausts its own slots.

use dashmap::DashMap;
use orb_domain::error::{Error, Result};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounded call slots per provider instance
pub struct ProviderPools {
    limit: usize,
    semaphores: DashMap<String, Arc<Semaphore>>,
}

impl ProviderPools {
    /// Allow `limit` concurrent calls per provider
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            semaphores: DashMap::new(),
        }
    }

    /// Slots per provider
    pub fn limit(&self) -> usize {
        self.limit
    }

    fn semaphore(&self, provider: &str) -> Arc<Semaphore> {
        self.semaphores
            .entry(provider.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(self.limit)))
            .clone()
    }

    /// Wait for a call slot on a provider
    pub async fn acquire(&self, provider: &str) -> Result<OwnedSemaphorePermit> {
        self.semaphore(provider)
            .acquire_owned()
            .await
            .map_err(|_| Error::internal(format!("Call pool for '{}' is closed", provider)))
    }

    /// Free call slots on a provider
    pub fn available(&self, provider: &str) -> usize {
        self.semaphores
            .get(provider)
            .map(|s| s.available_permits())
            .unwrap_or(self.limit)
    }
}
