//! Storage Implementations
//!
//! In-memory, optimistically versioned repositories. Every write is a
//! compare-and-swap on the stored version: `save` creates version 1,
//! `update` succeeds only when the caller's version matches and stores
//! the next one.

mod in_memory;

pub use in_memory::{InMemoryMachineRepository, InMemoryRequestRepository, InMemoryTemplateRepository};
