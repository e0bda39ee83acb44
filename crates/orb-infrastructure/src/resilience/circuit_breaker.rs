//! Circuit Breaker Module
//!
//! One breaker per provider instance, kept in a shared map:
//!
//! ```text
//! Closed ──failures ≥ threshold──▶ Open ──recovery timeout──▶ HalfOpen
//!   ▲                                ▲                           │
//!   └────────trial succeeds──────────┼───────────────────────────┤
//!                                    └──────trial fails──────────┘
//! ```
//!
//! Only transient failures count. Half-open admits a single trial call;
//! everything else is rejected until the trial settles.

use crate::config::ResilienceConfig;
use dashmap::DashMap;
use orb_domain::error::{Error, Result};
use orb_domain::value_objects::ProviderHealthStatus;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitBreakerState {
    /// Circuit is closed, requests flow normally
    Closed,
    /// Circuit is open, requests are blocked
    Open {
        /// When the circuit opened
        opened_at: Instant,
    },
    /// Circuit is half-open, testing if the provider recovered
    HalfOpen,
}

impl std::fmt::Display for CircuitBreakerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitBreakerState::Closed => write!(f, "closed"),
            CircuitBreakerState::Open { .. } => write!(f, "open"),
            CircuitBreakerState::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Circuit breaker configuration
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive transient failures before opening the circuit
    pub failure_threshold: u32,
    /// Time to wait before attempting recovery
    pub recovery_timeout: Duration,
}

impl CircuitBreakerConfig {
    /// Create a configuration with explicit values
    pub fn new(failure_threshold: u32, recovery_timeout: Duration) -> Self {
        Self {
            failure_threshold,
            recovery_timeout,
        }
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self::from(&ResilienceConfig::default())
    }
}

impl From<&ResilienceConfig> for CircuitBreakerConfig {
    fn from(config: &ResilienceConfig) -> Self {
        Self::new(
            config.circuit_breaker_failure_threshold,
            config.recovery_timeout(),
        )
    }
}

/// Point-in-time view of one breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerSnapshot {
    /// Effective state
    pub state: CircuitBreakerState,
    /// Transient failures since the last success
    pub consecutive_failures: u32,
    /// When the circuit last opened
    pub opened_at: Option<Instant>,
}

#[derive(Debug)]
struct Breaker {
    state: CircuitBreakerState,
    consecutive_failures: u32,
    trial_in_flight: bool,
}

impl Default for Breaker {
    fn default() -> Self {
        Self {
            state: CircuitBreakerState::Closed,
            consecutive_failures: 0,
            trial_in_flight: false,
        }
    }
}

impl Breaker {
    /// State with the recovery timeout applied
    fn effective_state(&self, recovery_timeout: Duration) -> CircuitBreakerState {
        match self.state {
            CircuitBreakerState::Open { opened_at } if opened_at.elapsed() >= recovery_timeout => {
                CircuitBreakerState::HalfOpen
            }
            state => state,
        }
    }
}

/// Per-provider circuit breakers
pub struct CircuitBreakerRegistry {
    config: CircuitBreakerConfig,
    breakers: DashMap<String, Breaker>,
}

impl CircuitBreakerRegistry {
    /// Create an empty registry; breakers start closed on first use
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            breakers: DashMap::new(),
        }
    }

    /// Configuration shared by every breaker
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Ask to call a provider
    ///
    /// Fails with a `CircuitOpen` provider error when the circuit rejects the
    /// call. The permit must be settled with [`BreakerPermit::succeed`] or
    /// [`BreakerPermit::fail`]; dropping it unsettled leaves the counters
    /// untouched.
    pub fn try_acquire(self: &Arc<Self>, provider: &str) -> Result<BreakerPermit> {
        let mut breaker = self.breakers.entry(provider.to_string()).or_default();
        let trial = match breaker.state {
            CircuitBreakerState::Closed => false,
            CircuitBreakerState::Open { opened_at } => {
                if opened_at.elapsed() < self.config.recovery_timeout {
                    return Err(Error::circuit_open(provider));
                }
                info!("Circuit breaker {} transitioning to Half-Open", provider);
                breaker.state = CircuitBreakerState::HalfOpen;
                breaker.trial_in_flight = true;
                true
            }
            CircuitBreakerState::HalfOpen => {
                if breaker.trial_in_flight {
                    return Err(Error::circuit_open(provider));
                }
                breaker.trial_in_flight = true;
                true
            }
        };
        Ok(BreakerPermit {
            registry: Arc::clone(self),
            provider: provider.to_string(),
            trial,
            settled: false,
        })
    }

    fn on_success(&self, provider: &str, trial: bool) {
        let mut breaker = self.breakers.entry(provider.to_string()).or_default();
        if trial {
            breaker.trial_in_flight = false;
            info!("Circuit breaker {} transitioning to Closed", provider);
            breaker.state = CircuitBreakerState::Closed;
            breaker.consecutive_failures = 0;
        } else if breaker.state == CircuitBreakerState::Closed {
            breaker.consecutive_failures = 0;
        }
    }

    fn on_failure(&self, provider: &str, trial: bool) {
        let mut breaker = self.breakers.entry(provider.to_string()).or_default();
        breaker.consecutive_failures = breaker.consecutive_failures.saturating_add(1);
        if trial {
            breaker.trial_in_flight = false;
            warn!("Circuit breaker {} trial failed, transitioning to Open", provider);
            breaker.state = CircuitBreakerState::Open {
                opened_at: Instant::now(),
            };
        } else if breaker.state == CircuitBreakerState::Closed
            && breaker.consecutive_failures >= self.config.failure_threshold
        {
            warn!(
                "Circuit breaker {} transitioning to Open after {} consecutive failures",
                provider, breaker.consecutive_failures
            );
            breaker.state = CircuitBreakerState::Open {
                opened_at: Instant::now(),
            };
        }
    }

    fn on_abandon(&self, provider: &str, trial: bool) {
        if trial {
            if let Some(mut breaker) = self.breakers.get_mut(provider) {
                breaker.trial_in_flight = false;
            }
        }
    }

    /// Effective state of a provider's breaker
    pub fn state(&self, provider: &str) -> CircuitBreakerState {
        self.breakers
            .get(provider)
            .map(|b| b.effective_state(self.config.recovery_timeout))
            .unwrap_or(CircuitBreakerState::Closed)
    }

    /// Health derived from the breaker state
    pub fn health(&self, provider: &str) -> ProviderHealthStatus {
        match self.state(provider) {
            CircuitBreakerState::Closed => ProviderHealthStatus::Healthy,
            CircuitBreakerState::HalfOpen => ProviderHealthStatus::Degraded,
            CircuitBreakerState::Open { .. } => ProviderHealthStatus::Unhealthy,
        }
    }

    /// Inspect a provider's breaker
    pub fn snapshot(&self, provider: &str) -> CircuitBreakerSnapshot {
        match self.breakers.get(provider) {
            Some(breaker) => CircuitBreakerSnapshot {
                state: breaker.effective_state(self.config.recovery_timeout),
                consecutive_failures: breaker.consecutive_failures,
                opened_at: match breaker.state {
                    CircuitBreakerState::Open { opened_at } => Some(opened_at),
                    _ => None,
                },
            },
            None => CircuitBreakerSnapshot {
                state: CircuitBreakerState::Closed,
                consecutive_failures: 0,
                opened_at: None,
            },
        }
    }

    /// Close a provider's breaker and clear its counters
    pub fn reset(&self, provider: &str) {
        if self.breakers.remove(provider).is_some() {
            info!("Circuit breaker {} reset", provider);
        }
    }
}

/// Admission to call a provider, settled with the call's outcome
#[must_use = "settle the permit with succeed() or fail()"]
pub struct BreakerPermit {
    registry: Arc<CircuitBreakerRegistry>,
    provider: String,
    trial: bool,
    settled: bool,
}

impl BreakerPermit {
    /// Whether this permit is the half-open trial call
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    /// The provider answered
    pub fn succeed(mut self) {
        self.settled = true;
        self.registry.on_success(&self.provider, self.trial);
    }

    /// The provider failed transiently
    pub fn fail(mut self) {
        self.settled = true;
        self.registry.on_failure(&self.provider, self.trial);
    }
}

impl Drop for BreakerPermit {
    fn drop(&mut self) {
        if !self.settled {
            self.registry.on_abandon(&self.provider, self.trial);
        }
    }
}
