//! Provider Adapter Implementations
//!
//! | Adapter | Registry name | Description |
//! |---------|---------------|-------------|
//! | [`InMemoryCloudAdapter`] | `in_memory` | Simulated cloud serving every provisioning API |
//! | [`NullProviderAdapter`] | `null` | No-op stub that never produces capacity |

pub mod in_memory;
pub mod null;

pub use in_memory::{FulfillmentMode, InMemoryCloudAdapter, Operation};
pub use null::NullProviderAdapter;
