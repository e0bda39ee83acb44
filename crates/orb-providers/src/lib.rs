//! # Open Resource Broker - Provider Implementations
//!
//! Implementations of the ports declared in `orb-domain` and
//! `orb-application`.
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Adapter | `ProviderAdapter` | InMemoryCloud, Null |
//! | Discovery | `ResourceDiscovery` | RunInstances, Fleet, SpotFleet, AutoScalingGroup |
//! | Storage | `RequestRepository`, `MachineRepository`, `TemplateRepository` | InMemory |
//! | Clock | `Clock` | Manual |
//!
//! Adapters register themselves in the `PROVIDER_ADAPTERS` linkme slice;
//! linking this crate is enough to make them resolvable by name.
//!
//! ## Usage
//!
//! ```ignore
//! use orb_providers::adapter::InMemoryCloudAdapter;
//! use orb_providers::discovery::default_discovery_registry;
//! use orb_providers::storage::InMemoryRequestRepository;
//! ```

pub use orb_domain::error::{Error, Result};
pub use orb_domain::ports::ProviderAdapter;

/// Provider adapter implementations
pub mod adapter;

/// Test clock
pub mod clock;

/// Resource discovery strategies, one per provisioning API
pub mod discovery;

/// In-memory versioned storage
pub mod storage;

pub use adapter::{FulfillmentMode, InMemoryCloudAdapter, NullProviderAdapter, Operation};
pub use clock::ManualClock;
pub use discovery::default_discovery_registry;
