//! External Provider Ports
//!
//! | Port | Description |
//! |------|-------------|
//! | ProviderAdapter | Create, inspect and terminate capacity on one provider instance |

/// Provider adapter port
pub mod adapter;

pub use adapter::{ProviderAdapter, ProvisionRequest, TerminationTarget};
