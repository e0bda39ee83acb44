//! # Open Resource Broker
//!
//! Provisions compute capacity across several configured provider instances.
//! A request names a template and a count; the broker picks a provider
//! instance, checks the template against its capabilities, launches through
//! the provider's adapter with retry and circuit breaking, and reconciles the
//! launched resources until the request settles.
//!
//! ## Example
//!
//! ```ignore
//! use orb::infrastructure::bootstrap::init_test_app;
//!
//! let app = init_test_app().await?;
//! let request_id = app.orchestrator().create_request("tpl-run", 2).await?;
//! let status = app.orchestrator().get_request_status(&request_id).await?;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - Entities, value objects, ports and errors
//! - `application` - Provider selection, capability validation and the request orchestrator
//! - `providers` - Provider adapters, discovery strategies and storage
//! - `infrastructure` - Configuration, logging, resilience and the composition root

/// Domain layer - entities, value objects and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use orb_domain::*;
}

/// Application layer - selection, validation and orchestration
pub mod application {
    pub use orb_application::*;
}

/// Provider layer - adapters, discovery strategies and storage
pub mod providers {
    pub use orb_providers::*;
}

/// Infrastructure layer - config, logging, resilience and bootstrap
pub mod infrastructure {
    pub use orb_infrastructure::*;
}

mod run;

pub use domain::{Error, Result};
pub use run::{load_config, run};
