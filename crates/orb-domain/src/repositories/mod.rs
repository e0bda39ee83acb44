//! Repository Interfaces
//!
//! Storage contracts for requests, machines and templates. Every entity
//! carries a `version`; `update` succeeds only when the caller's version
//! matches the stored one and returns the entity with the incremented
//! version. A mismatch fails with
//! [`Error::VersionConflict`](crate::error::Error::VersionConflict), so a
//! stale writer can never overwrite newer state. Atomicity is per entity;
//! nothing spans entities.
//!
//! | Repository | Description |
//! |------------|-------------|
//! | [`RequestRepository`] | Requests, queried by [`RequestFilter`](crate::value_objects::RequestFilter) |
//! | [`MachineRepository`] | Machines, listed per request |
//! | [`TemplateRepository`] | Templates |

/// Machine repository interface
pub mod machine_repository;
/// Request repository interface
pub mod request_repository;
/// Template repository interface
pub mod template_repository;

pub use machine_repository::MachineRepository;
pub use request_repository::RequestRepository;
pub use template_repository::TemplateRepository;
