//! Domain Value Objects
//!
//! Immutable values without identity, compared by their attributes.
//!
//! | Value Object | Description |
//! |--------------|-------------|
//! | [`RequestId`] | Broker-assigned request identifier |
//! | [`ProviderApi`] | Provisioning API variant (RunInstances, EC2Fleet, SpotFleet, ASG) |
//! | [`InstanceDescriptor`] | One instance as reported by a provider |
//! | [`SelectionPolicy`] | Provider selection strategy |
//! | [`ProviderSelectionResult`] | Chosen provider plus ordered alternatives |
//! | [`ValidationReport`] | Capability validation outcome |
//! | [`RequestView`] | Read model returned to front ends |

/// Provider health value objects
pub mod health;
/// Identifiers
pub mod ids;
/// Provider-reported instance data
pub mod instance;
/// Provisioning API variants, fleet sub-types and pricing models
pub mod provider_api;
/// Provider selection policies and results
pub mod selection;
/// Request and machine lifecycle states
pub mod status;
/// Capability validation levels and reports
pub mod validation;
/// Read models and query filters
pub mod views;

pub use health::ProviderHealthStatus;
pub use ids::RequestId;
pub use instance::{InstanceDescriptor, InstanceState, Membership, ResourceHandle};
pub use provider_api::{FleetType, PricingModel, ProviderApi};
pub use selection::{ProviderSelectionResult, SelectionPolicy};
pub use status::{MachineStatus, RequestStatus};
pub use validation::{ValidationLevel, ValidationReport};
pub use views::{MachineView, RequestFilter, RequestView};
