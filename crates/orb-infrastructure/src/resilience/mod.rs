//! Resilience
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CircuitBreakerRegistry`] | Per-provider circuit breakers |
//! | [`RetryPolicy`] | Exponential backoff with jitter for transient errors |
//! | [`ProviderPools`] | Per-provider bound on concurrent adapter calls |
//! | [`ResilientInvoker`] | Composes the above around every adapter call, with create-time fallback |

pub mod circuit_breaker;
pub mod invoker;
pub mod pool;
pub mod retry;

pub use circuit_breaker::{
    BreakerPermit, CircuitBreakerConfig, CircuitBreakerRegistry, CircuitBreakerSnapshot,
    CircuitBreakerState,
};
pub use invoker::{InvokerComponents, ResilientInvoker};
pub use pool::ProviderPools;
pub use retry::RetryPolicy;
