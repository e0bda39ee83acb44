//! Use Cases
//!
//! | Use Case | Description |
//! |----------|-------------|
//! | [`RequestOrchestrator`] | Request lifecycle: create, reconcile, cancel, query |

/// Request lifecycle orchestration
pub mod request_orchestrator;

pub use request_orchestrator::{OrchestratorComponents, RequestOrchestrator};
