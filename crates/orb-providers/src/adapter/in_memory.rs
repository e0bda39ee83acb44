//! In-memory cloud adapter
//!
//! Simulates a cloud provider serving RunInstances, fleets, spot fleets and
//! auto-scaling groups. State lives in process memory and is lost on
//! restart. Tests drive it directly: queue handle ids, script failures,
//! grow fleet membership and delete resources out from under the broker.
//!
//! In [`FulfillmentMode::Immediate`] every create is fully satisfied with
//! running instances. In [`FulfillmentMode::Manual`] synchronous APIs
//! return pending instances and asynchronous ones start empty until
//! [`InMemoryCloudAdapter::fulfil`] adds capacity.

use async_trait::async_trait;
use dashmap::DashMap;
use orb_domain::entities::ProviderCapabilities;
use orb_domain::error::{Error, ProviderErrorKind, Result};
use orb_domain::ports::{ProviderAdapter, ProvisionRequest, TerminationTarget};
use orb_domain::value_objects::{
    FleetType, InstanceDescriptor, InstanceState, Membership, ProviderApi, ResourceHandle,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

/// Adapter operation, for failure scripting and call accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `create`
    Create,
    /// `list_members`
    ListMembers,
    /// `describe_instances`
    DescribeInstances,
    /// `terminate`
    Terminate,
}

/// How created resources acquire capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FulfillmentMode {
    /// Capacity is running as soon as `create` returns
    #[default]
    Immediate,
    /// Capacity appears only through [`InMemoryCloudAdapter::fulfil`]
    Manual,
}

struct SimResource {
    handle: ResourceHandle,
    target: u32,
    members: Vec<String>,
    fulfilled: bool,
}

#[derive(Default)]
struct CloudState {
    resources: HashMap<String, SimResource>,
    instances: HashMap<String, InstanceDescriptor>,
    failures: HashMap<Operation, VecDeque<(ProviderErrorKind, String)>>,
    queued_handles: VecDeque<String>,
    sequence: u64,
}

impl CloudState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.sequence += 1;
        format!("{}-{:08x}", prefix, self.sequence)
    }

    fn launch(&mut self, state: InstanceState) -> String {
        let id = self.next_id("i");
        let octet = self.sequence % 250 + 1;
        let descriptor = InstanceDescriptor::new(&id, state)
            .with_private_ip(format!("10.0.{}.{}", self.sequence / 250 % 256, octet));
        self.instances.insert(id.clone(), descriptor);
        id
    }
}

/// Simulated cloud provider
pub struct InMemoryCloudAdapter {
    name: String,
    capabilities: ProviderCapabilities,
    mode: FulfillmentMode,
    latency: Option<Duration>,
    state: Mutex<CloudState>,
    calls: DashMap<Operation, u64>,
}

impl InMemoryCloudAdapter {
    /// Create an adapter serving the named provider instance
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: ProviderCapabilities::all(),
            mode: FulfillmentMode::Immediate,
            latency: None,
            state: Mutex::new(CloudState::default()),
            calls: DashMap::new(),
        }
    }

    /// Replace the advertised capabilities
    pub fn with_capabilities(mut self, capabilities: ProviderCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the fulfillment mode
    pub fn with_mode(mut self, mode: FulfillmentMode) -> Self {
        self.mode = mode;
        self
    }

    /// Delay every call, simulating network latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn state(&self) -> MutexGuard<'_, CloudState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Use `id` as the handle of the next created resource
    pub fn queue_handle_id(&self, id: impl Into<String>) {
        self.state().queued_handles.push_back(id.into());
    }

    /// Make the next `times` calls of `operation` fail with `kind`
    pub fn fail_next(&self, operation: Operation, kind: ProviderErrorKind, times: usize) {
        let mut state = self.state();
        let queue = state.failures.entry(operation).or_default();
        for _ in 0..times {
            queue.push_back((kind, format!("simulated {} failure", kind)));
        }
    }

    /// Number of calls made to `operation` (including failed ones)
    pub fn call_count(&self, operation: Operation) -> u64 {
        self.calls.get(&operation).map(|c| *c).unwrap_or(0)
    }

    /// Bring a resource to `running` running members
    ///
    /// Pending members are started first, then new members are launched.
    /// The resource becomes fulfilled once it reaches its target.
    pub fn fulfil(&self, handle_id: &str, running: u32) -> Result<()> {
        let mut state = self.state();
        let CloudState {
            resources,
            instances,
            ..
        } = &mut *state;
        let resource = resources
            .get_mut(handle_id)
            .ok_or_else(|| Error::resource_not_found(handle_id))?;

        let mut running_now = 0u32;
        for id in &resource.members {
            if let Some(instance) = instances.get_mut(id) {
                if instance.state == InstanceState::Pending && running_now < running {
                    instance.state = InstanceState::Running;
                }
                if instance.state == InstanceState::Running {
                    running_now += 1;
                }
            }
        }
        let missing = running.saturating_sub(running_now);
        let target = resource.target;
        drop(state);

        for _ in 0..missing {
            let mut state = self.state();
            let id = state.launch(InstanceState::Running);
            if let Some(resource) = state.resources.get_mut(handle_id) {
                resource.members.push(id);
            }
        }

        let mut state = self.state();
        if let Some(resource) = state.resources.get_mut(handle_id) {
            resource.fulfilled = resource.members.len() >= target as usize;
            if resource.fulfilled {
                resource.handle.instance_ids.clone_from(&resource.members);
            }
        }
        Ok(())
    }

    /// Mark whether a resource has finished adding capacity
    pub fn set_fulfilled(&self, handle_id: &str, fulfilled: bool) -> Result<()> {
        let mut state = self.state();
        let resource = state
            .resources
            .get_mut(handle_id)
            .ok_or_else(|| Error::resource_not_found(handle_id))?;
        resource.fulfilled = fulfilled;
        Ok(())
    }

    /// Change the state of one instance
    pub fn set_instance_state(&self, instance_id: &str, new_state: InstanceState) -> Result<()> {
        let mut state = self.state();
        let instance = state
            .instances
            .get_mut(instance_id)
            .ok_or_else(|| Error::not_found(format!("instance {}", instance_id)))?;
        instance.state = new_state;
        Ok(())
    }

    /// Delete a resource and its instances without going through `terminate`
    pub fn delete_resource(&self, handle_id: &str) {
        let mut state = self.state();
        if let Some(resource) = state.resources.remove(handle_id) {
            for id in resource.members {
                state.instances.remove(&id);
            }
        }
    }

    /// Member ids of a resource
    pub fn members(&self, handle_id: &str) -> Vec<String> {
        self.state()
            .resources
            .get(handle_id)
            .map(|r| r.members.clone())
            .unwrap_or_default()
    }

    /// State of one instance
    pub fn instance_state(&self, instance_id: &str) -> Option<InstanceState> {
        self.state().instances.get(instance_id).map(|i| i.state)
    }

    /// Whether a resource still exists
    pub fn has_resource(&self, handle_id: &str) -> bool {
        self.state().resources.contains_key(handle_id)
    }

    async fn enter(&self, operation: Operation) -> Result<()> {
        *self.calls.entry(operation).or_insert(0) += 1;
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let scripted = self
            .state()
            .failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);
        match scripted {
            Some((kind, message)) => Err(Error::Provider {
                provider: self.name.clone(),
                kind,
                message,
            }),
            None => Ok(()),
        }
    }
}

fn handle_prefix(api: ProviderApi) -> &'static str {
    match api {
        ProviderApi::RunInstances => "r",
        ProviderApi::EC2Fleet => "fleet",
        ProviderApi::SpotFleet => "sfr",
        ProviderApi::ASG => "asg",
    }
}

#[async_trait]
impl ProviderAdapter for InMemoryCloudAdapter {
    fn provider_name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities.clone()
    }

    async fn create(&self, request: &ProvisionRequest) -> Result<ResourceHandle> {
        self.enter(Operation::Create).await?;

        let api = request.template.effective_api();
        if !self.capabilities.supports_api(api) {
            return Err(Error::permanent(
                &self.name,
                format!("{} is not available on this provider", api),
            ));
        }
        let fleet_type = api
            .uses_fleet_type()
            .then(|| request.template.fleet_type.unwrap_or(FleetType::Request));
        let synchronous = match api {
            ProviderApi::RunInstances => true,
            ProviderApi::EC2Fleet => fleet_type == Some(FleetType::Instant),
            ProviderApi::SpotFleet | ProviderApi::ASG => false,
        };

        let mut state = self.state();
        let queued = state.queued_handles.pop_front();
        let id = match queued {
            Some(id) => id,
            None => state.next_id(handle_prefix(api)),
        };

        let mut handle = ResourceHandle::new(&id, api);
        if let Some(fleet_type) = fleet_type {
            handle = handle.with_fleet_type(fleet_type);
        }

        let launch_now = synchronous || self.mode == FulfillmentMode::Immediate;
        let mut members = Vec::new();
        if launch_now {
            let launch_state = match self.mode {
                FulfillmentMode::Immediate => InstanceState::Running,
                FulfillmentMode::Manual => InstanceState::Pending,
            };
            for _ in 0..request.count {
                members.push(state.launch(launch_state));
            }
        }
        if synchronous {
            handle = handle.with_instance_ids(members.clone());
        }

        state.resources.insert(
            id.clone(),
            SimResource {
                handle: handle.clone(),
                target: request.count,
                fulfilled: launch_now,
                members,
            },
        );
        debug!(provider = %self.name, handle = %id, api = %api, count = request.count, "Simulated resource created");
        Ok(handle)
    }

    async fn list_members(&self, handle: &ResourceHandle) -> Result<Membership> {
        self.enter(Operation::ListMembers).await?;
        let state = self.state();
        let resource = state
            .resources
            .get(&handle.id)
            .ok_or_else(|| Error::resource_not_found(&handle.id))?;
        Ok(Membership {
            instance_ids: resource.members.clone(),
            fulfilled: resource.fulfilled,
        })
    }

    async fn describe_instances(&self, instance_ids: &[String]) -> Result<Vec<InstanceDescriptor>> {
        self.enter(Operation::DescribeInstances).await?;
        let state = self.state();
        Ok(instance_ids
            .iter()
            .filter_map(|id| state.instances.get(id).cloned())
            .collect())
    }

    async fn terminate(&self, target: &TerminationTarget) -> Result<()> {
        self.enter(Operation::Terminate).await?;
        let mut state = self.state();
        match target {
            TerminationTarget::Resource(handle) => {
                let resource = state
                    .resources
                    .remove(&handle.id)
                    .ok_or_else(|| Error::resource_not_found(&handle.id))?;
                for id in &resource.members {
                    if let Some(instance) = state.instances.get_mut(id) {
                        instance.state = InstanceState::Terminated;
                    }
                }
            }
            TerminationTarget::Instances(ids) => {
                for id in ids {
                    if let Some(instance) = state.instances.get_mut(id) {
                        instance.state = InstanceState::Terminated;
                    }
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

use orb_application::ports::registry::{
    PROVIDER_ADAPTERS, ProviderAdapterConfig, ProviderAdapterEntry,
};

/// Factory function for creating in-memory cloud adapters.
///
/// `extra.fulfillment = "manual"` selects manual fulfillment; `extra.latency_ms`
/// adds simulated latency.
fn in_memory_adapter_factory(
    config: &ProviderAdapterConfig,
) -> std::result::Result<Arc<dyn ProviderAdapter>, String> {
    let mut adapter = InMemoryCloudAdapter::new(&config.instance_name);
    if let Some(capabilities) = &config.capabilities {
        adapter = adapter.with_capabilities(capabilities.clone());
    }
    match config.extra.get("fulfillment").map(String::as_str) {
        None | Some("immediate") => {}
        Some("manual") => adapter = adapter.with_mode(FulfillmentMode::Manual),
        Some(other) => return Err(format!("Unknown fulfillment mode '{}'", other)),
    }
    if let Some(latency) = config.extra.get("latency_ms") {
        let ms: u64 = latency
            .parse()
            .map_err(|e| format!("Invalid latency_ms '{}': {}", latency, e))?;
        adapter = adapter.with_latency(Duration::from_millis(ms));
    }
    Ok(Arc::new(adapter))
}

#[linkme::distributed_slice(PROVIDER_ADAPTERS)]
static IN_MEMORY_ADAPTER: ProviderAdapterEntry = ProviderAdapterEntry {
    name: "in_memory",
    description: "Simulated cloud provider (non-persistent)",
    factory: in_memory_adapter_factory,
};
