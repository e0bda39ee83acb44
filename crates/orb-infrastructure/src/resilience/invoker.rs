//! Resilient Invoker
//!
//! Wraps every adapter call in the per-provider concurrency bound, the
//! circuit breaker and the retry policy:
//!
//! ```text
//! breaker.try_acquire ──▶ pool.acquire ──▶ adapter call
//!        │                                    │
//!   CircuitOpen                  Transient ───┼── backoff, retry (≤ max_attempts)
//!   (no call)                    Permanent ───┼── abort, breaker success
//!                                Ok ──────────┘── breaker success
//! ```
//!
//! `create` walks the selection's candidates in order. An alternative is
//! only tried if it is still enabled and passes capability validation;
//! `discover` and `terminate` address one instance and never fall back.
//!
//! `discover` carries the request's cancellation token: no attempt and no
//! retry starts once it fires, and a pending backoff is cut short.

use crate::registry::ProviderRegistry;
use crate::resilience::{CircuitBreakerRegistry, ProviderPools, RetryPolicy};
use async_trait::async_trait;
use orb_application::domain_services::{CapabilityValidator, RandomSource};
use orb_application::ports::{
    CreateOutcome, DiscoveryRegistry, DiscoveryResult, ProviderCatalog, ProviderInvoker,
};
use orb_domain::error::{Error, Result};
use orb_domain::ports::{ProviderAdapter, ProvisionRequest, TerminationTarget};
use orb_domain::value_objects::{ProviderSelectionResult, ResourceHandle};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Collaborators of the invoker
pub struct InvokerComponents {
    /// Adapter lookup and instance snapshot
    pub registry: Arc<ProviderRegistry>,
    /// Re-validation of fallback candidates
    pub validator: CapabilityValidator,
    /// Discovery strategy per provisioning API
    pub discovery: DiscoveryRegistry,
    /// Per-provider circuit breakers
    pub breakers: Arc<CircuitBreakerRegistry>,
    /// Per-provider call slots
    pub pools: ProviderPools,
    /// Backoff schedule
    pub retry: RetryPolicy,
    /// Jitter source
    pub random: Arc<dyn RandomSource>,
}

/// Provider invoker with retry, circuit breaking and fallback
pub struct ResilientInvoker {
    registry: Arc<ProviderRegistry>,
    validator: CapabilityValidator,
    discovery: DiscoveryRegistry,
    breakers: Arc<CircuitBreakerRegistry>,
    pools: ProviderPools,
    retry: RetryPolicy,
    random: Arc<dyn RandomSource>,
}

impl ResilientInvoker {
    /// Create an invoker
    pub fn new(components: InvokerComponents) -> Self {
        Self {
            registry: components.registry,
            validator: components.validator,
            discovery: components.discovery,
            breakers: components.breakers,
            pools: components.pools,
            retry: components.retry,
            random: components.random,
        }
    }

    /// Circuit breakers used by this invoker
    pub fn breakers(&self) -> &Arc<CircuitBreakerRegistry> {
        &self.breakers
    }

    /// Call one provider with breaker, pool and retry applied
    ///
    /// Returns the outcome and the number of adapter calls made.
    async fn call<T, F, Fut>(
        &self,
        provider: &str,
        operation: &str,
        cancel: Option<&CancellationToken>,
        mut op: F,
    ) -> (Result<T>, u32)
    where
        F: FnMut(Arc<dyn ProviderAdapter>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let cancelled = || cancel.is_some_and(CancellationToken::is_cancelled);
        let mut attempts = 0;
        loop {
            if cancelled() {
                debug!(
                    provider,
                    operation,
                    attempt = attempts,
                    "Call skipped after cancellation"
                );
                return (Err(Error::cancelled(operation)), attempts);
            }
            let permit = match self.breakers.try_acquire(provider) {
                Ok(permit) => permit,
                Err(e) => {
                    debug!(provider, operation, "Call rejected by open circuit");
                    return (Err(e), attempts);
                }
            };
            let adapter = match self.registry.adapter(provider) {
                Ok(adapter) => adapter,
                Err(e) => return (Err(e), attempts),
            };

            attempts += 1;
            let result = match self.pools.acquire(provider).await {
                Ok(_slot) => op(adapter).await,
                Err(e) => return (Err(e), attempts),
            };

            match result {
                Ok(value) => {
                    permit.succeed();
                    return (Ok(value), attempts);
                }
                Err(e) if e.is_transient() => {
                    permit.fail();
                    if !self.retry.allows_retry(attempts) {
                        warn!(
                            provider,
                            operation,
                            attempt = attempts,
                            error = %e,
                            "Retries exhausted"
                        );
                        return (Err(e), attempts);
                    }
                    let delay = self.retry.backoff(attempts, self.random.as_ref());
                    warn!(
                        provider,
                        operation,
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient provider error, retrying"
                    );
                    match cancel {
                        Some(token) => {
                            tokio::select! {
                                () = token.cancelled() => {}
                                () = tokio::time::sleep(delay) => {}
                            }
                        }
                        None => tokio::time::sleep(delay).await,
                    }
                }
                Err(e) => {
                    if e.is_permanent() {
                        permit.succeed();
                    }
                    debug!(
                        provider,
                        operation,
                        attempt = attempts,
                        error = %e,
                        "Provider call failed"
                    );
                    return (Err(e), attempts);
                }
            }
        }
    }

    /// Whether a fallback candidate may still serve the request
    fn viable_alternative(&self, name: &str, request: &ProvisionRequest) -> bool {
        let Some(instance) = self.registry.get(name) else {
            debug!(provider = name, "Skipping alternative no longer configured");
            return false;
        };
        if !instance.enabled {
            debug!(provider = name, "Skipping disabled alternative");
            return false;
        }
        let report = self
            .validator
            .validate(&request.template, request.count, &instance);
        if !report.valid {
            debug!(
                provider = name,
                errors = report.errors.len(),
                "Skipping alternative failing validation"
            );
        }
        report.valid
    }
}

#[async_trait]
impl ProviderInvoker for ResilientInvoker {
    async fn create(
        &self,
        request: &ProvisionRequest,
        selection: &ProviderSelectionResult,
    ) -> Result<CreateOutcome> {
        let mut attempted = Vec::new();
        let mut total_attempts = 0;
        let mut last_error = None;

        for (index, name) in selection.candidates().enumerate() {
            if index > 0 && !self.viable_alternative(name, request) {
                continue;
            }
            attempted.push(name.to_string());

            let (result, attempts) = self
                .call(name, "create", None, |adapter| async move {
                    adapter.create(request).await
                })
                .await;
            total_attempts += attempts;

            match result {
                Ok(handle) => {
                    let provider_type = self
                        .registry
                        .get(name)
                        .map(|p| p.provider_type)
                        .unwrap_or_else(|| selection.provider_type.clone());
                    if index > 0 {
                        info!(
                            request_id = %request.request_id,
                            primary = %selection.provider_name,
                            provider = name,
                            "Create served by fallback provider"
                        );
                    }
                    return Ok(CreateOutcome {
                        provider_name: name.to_string(),
                        provider_type,
                        handle,
                        attempts: total_attempts,
                        fell_back: index > 0,
                    });
                }
                Err(e) if e.allows_fallback() => {
                    warn!(
                        request_id = %request.request_id,
                        provider = name,
                        error = %e,
                        "Create failed, trying next candidate"
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        let last = last_error
            .unwrap_or_else(|| Error::internal("no provider candidate could be attempted"));
        Err(Error::ProvidersExhausted {
            attempted,
            last: Box::new(last),
        })
    }

    async fn discover(
        &self,
        provider: &str,
        handle: &ResourceHandle,
        cancel: &CancellationToken,
    ) -> Result<DiscoveryResult> {
        let strategy = self.discovery.get(handle.api)?;
        let (result, _) = self
            .call(provider, "discover", Some(cancel), |adapter| {
                let strategy = Arc::clone(&strategy);
                async move { strategy.discover(adapter.as_ref(), handle, cancel).await }
            })
            .await;
        result
    }

    async fn terminate(&self, provider: &str, target: &TerminationTarget) -> Result<()> {
        let (result, _) = self
            .call(provider, "terminate", None, |adapter| async move {
                adapter.terminate(target).await
            })
            .await;
        result
    }
}
