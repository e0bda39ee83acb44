//! Domain Port Interfaces
//!
//! Boundary contracts that outer layers implement:
//! - **providers/** - cloud provider adapters
//! - **infrastructure/** - runtime services (clock)

/// Infrastructure service ports
pub mod infrastructure;
/// External provider ports
pub mod providers;

pub use infrastructure::Clock;
pub use providers::{ProviderAdapter, ProvisionRequest, TerminationTarget};
