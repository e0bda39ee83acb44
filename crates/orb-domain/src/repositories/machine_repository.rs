//! Machine Repository Interface

use async_trait::async_trait;

use crate::entities::Machine;
use crate::error::Result;
use crate::value_objects::RequestId;

/// Versioned machine storage
#[async_trait]
pub trait MachineRepository: Send + Sync {
    /// Insert a new machine; fails if the id already exists
    async fn save(&self, machine: &Machine) -> Result<Machine>;

    /// Fetch a machine by id
    async fn get(&self, machine_id: &str) -> Result<Option<Machine>>;

    /// Replace a machine if `machine.version` matches the stored version
    async fn update(&self, machine: &Machine) -> Result<Machine>;

    /// Machines owned by a request, in creation order
    async fn list_by_request(&self, request_id: &RequestId) -> Result<Vec<Machine>>;
}
