//! Domain Services
//!
//! Pure, synchronous services used by the request orchestrator.
//!
//! | Service | Description |
//! |---------|-------------|
//! | [`ProviderSelector`] | Picks a provider instance under a selection policy |
//! | [`CapabilityValidator`] | Checks a template against a provider's capabilities |
//! | [`RandomSource`] | Injectable randomness for weighted selection |
//! | [`assess`] | Derives the next request status from discovered machines |

/// Injectable random source
pub mod random;
/// Reconciliation policy and status assessment
pub mod reconciliation;
/// Provider selection
pub mod selection;
/// Capability validation
pub mod validation;

pub use random::{RandomSource, SeededRandom, ThreadRandom};
pub use reconciliation::{
    Assessment, FulfillmentSnapshot, PartialFulfillmentPolicy, ReconciliationPolicy, assess,
};
pub use selection::ProviderSelector;
pub use validation::CapabilityValidator;
