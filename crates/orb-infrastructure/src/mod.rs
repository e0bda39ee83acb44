//! # Infrastructure Layer
//!
//! Runtime concerns of the resource broker.
//!
//! ## Module Categories
//!
//! ### Configuration & Composition
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | TOML + environment configuration via figment |
//! | [`bootstrap`] | Composition root building the running broker |
//! | [`constants`] | Infrastructure defaults |
//!
//! ### Providers
//! | Module | Description |
//! |--------|-------------|
//! | [`registry`] | Config-derived provider registry with atomic reload |
//! | [`resilience`] | Retry, circuit breaking, concurrency bounds and fallback |
//! | [`scheduler`] | Jittered background reconciliation |
//!
//! ### Observability & Errors
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | Structured logging with tracing |
//! | [`error_ext`] | Context extension for foreign errors |

pub mod bootstrap;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error_ext;
pub mod logging;
pub mod registry;
pub mod resilience;
pub mod scheduler;

// Re-export commonly used types
pub use bootstrap::{AppContext, init_app, init_app_with_clock};
pub use clock::SystemClock;
pub use config::{AppConfig, ConfigLoader};
pub use error_ext::ErrorContext;
pub use registry::ProviderRegistry;
pub use resilience::{CircuitBreakerRegistry, ResilientInvoker};
pub use scheduler::ReconciliationScheduler;
