//! Application Layer - Open Resource Broker
//!
//! Use cases and pure services of the resource broker.
//!
//! ## Architecture
//!
//! The application layer:
//! - Selects provider instances and validates templates against them
//!   (`domain_services`)
//! - Declares the ports the infrastructure layer implements: the resilient
//!   invoker, the provider catalog, discovery strategies and the adapter
//!   registry (`ports`)
//! - Drives the request lifecycle state machine (`use_cases`)
//!
//! ## Dependencies
//!
//! This crate depends only on:
//! - `orb-domain`: entities, value objects and port traits
//! - Pure Rust libraries for async, randomness and serialization

pub mod domain_services;
pub mod ports;
pub mod use_cases;

pub use domain_services::*;
pub use ports::*;
pub use use_cases::*;
