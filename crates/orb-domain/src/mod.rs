//! # Open Resource Broker - Domain Layer
//!
//! Core types for brokering compute-resource requests between a workload
//! manager and cloud-provider back ends. This crate defines the entities,
//! value objects and port contracts; it contains no I/O.
//!
//! ## Architecture
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`entities`] | Templates, provider instances, requests and machines |
//! | [`value_objects`] | Identifiers, API variants, selection and validation results, views |
//! | [`ports`] | Provider adapter and clock contracts |
//! | [`repositories`] | Versioned storage contracts for requests, machines and templates |
//! | [`error`] | Domain error taxonomy and classification helpers |
//! | [`constants`] | Domain defaults |
//!
//! ## Example
//!
//! ```
//! use orb_domain::entities::{Request, Template};
//! use orb_domain::value_objects::{ProviderApi, RequestStatus};
//!
//! let template = Template::new("tpl-web")
//!     .with_provider_api(ProviderApi::EC2Fleet)
//!     .with_instance_count(5);
//!
//! let request = Request::new(&template, 5);
//! assert_eq!(request.status, RequestStatus::Pending);
//! ```

/// Domain-level constants
pub mod constants;
/// Domain entities with identity
pub mod entities;
/// Domain error types
pub mod error;
/// Port interfaces implemented by outer layers
pub mod ports;
/// Storage contracts
pub mod repositories;
/// Immutable value objects
pub mod value_objects;

pub use entities::*;
pub use error::{Error, ProviderErrorKind, Result, SelectionError, ValidationErrorKind};
pub use value_objects::*;
