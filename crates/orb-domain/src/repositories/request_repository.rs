//! Request Repository Interface

use async_trait::async_trait;

use crate::entities::Request;
use crate::error::Result;
use crate::value_objects::{RequestFilter, RequestId};

/// Versioned request storage
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Insert a new request; fails if the id already exists
    ///
    /// Returns the stored request with its initial version.
    async fn save(&self, request: &Request) -> Result<Request>;

    /// Fetch a request by id
    async fn get(&self, request_id: &RequestId) -> Result<Option<Request>>;

    /// Replace a request if `request.version` matches the stored version
    ///
    /// Returns the stored request with the incremented version.
    async fn update(&self, request: &Request) -> Result<Request>;

    /// Requests matching the filter, oldest first
    async fn query(&self, filter: &RequestFilter) -> Result<Vec<Request>>;
}
