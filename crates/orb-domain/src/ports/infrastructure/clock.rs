//! Clock Port
//!
//! Lifecycle timestamps and timeout checks read time through this port so
//! reconciliation can be driven deterministically in tests.

use chrono::{DateTime, Utc};

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current UTC time
    fn now(&self) -> DateTime<Utc>;
}
