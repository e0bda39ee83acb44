//! Application Ports
//!
//! Contracts the infrastructure and provider layers implement for the
//! request orchestrator.
//!
//! | Port | Description |
//! |------|-------------|
//! | [`ProviderInvoker`] | Resilient create/discover/terminate calls |
//! | [`ProviderCatalog`] | Snapshot of configured provider instances |
//! | [`ResourceDiscovery`] | API-specific discovery strategy |
//! | [`RequestOrchestratorInterface`] | Orchestrator API consumed by front ends |
//! | [`registry`] | Compile-time adapter registration |

/// Provider catalog port
pub mod catalog;
/// Resource discovery strategies
pub mod discovery;
/// Provider invocation port
pub mod invoker;
/// Adapter registry
pub mod registry;
/// Application service interfaces
pub mod services;

pub use catalog::ProviderCatalog;
pub use discovery::{DiscoveryRegistry, DiscoveryResult, ResourceDiscovery};
pub use invoker::{CreateOutcome, ProviderInvoker};
pub use services::RequestOrchestratorInterface;
