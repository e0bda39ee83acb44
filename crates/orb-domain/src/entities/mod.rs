//! Domain Entities
//!
//! | Entity | Description |
//! |--------|-------------|
//! | [`Template`] | Named provisioning intent with provider hints |
//! | [`ProviderInstance`] | Configured provider endpoint with capabilities |
//! | [`Request`] | Tracked unit of work created from a template |
//! | [`Machine`] | One concrete instance belonging to a request |

/// Machine entity
pub mod machine;
/// Provider instance entity and capability set
pub mod provider;
/// Request entity and its state machine
pub mod request;
/// Template entity
pub mod template;

pub use machine::Machine;
pub use provider::{ProviderCapabilities, ProviderInstance};
pub use request::Request;
pub use template::Template;
