//! Tests for the request orchestrator
//!
//! Drives the full lifecycle against the simulated cloud adapter with a
//! manual clock. Provider calls go through a pass-through invoker; retry,
//! circuit breaking and fallback are covered by the infrastructure tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use orb_application::domain_services::{
    CapabilityValidator, PartialFulfillmentPolicy, ProviderSelector, ReconciliationPolicy,
    SeededRandom,
};
use orb_application::ports::{
    CreateOutcome, DiscoveryRegistry, DiscoveryResult, ProviderCatalog, ProviderInvoker,
    RequestOrchestratorInterface,
};
use orb_application::use_cases::{OrchestratorComponents, RequestOrchestrator};
use orb_domain::entities::{ProviderInstance, Request, Template};
use orb_domain::error::{Error, ProviderErrorKind, Result};
use orb_domain::ports::{Clock, ProviderAdapter, ProvisionRequest, TerminationTarget};
use orb_domain::repositories::{RequestRepository, TemplateRepository};
use orb_domain::value_objects::{
    InstanceState, MachineStatus, ProviderApi, ProviderSelectionResult, RequestFilter, RequestId,
    RequestStatus, ResourceHandle, SelectionPolicy, ValidationLevel,
};
use orb_providers::storage::{
    InMemoryMachineRepository, InMemoryRequestRepository, InMemoryTemplateRepository,
};
use orb_providers::{
    FulfillmentMode, InMemoryCloudAdapter, ManualClock, Operation, default_discovery_registry,
};
use tokio_util::sync::CancellationToken;

// ============================================================================
// Test doubles
// ============================================================================

struct StaticCatalog(Arc<Vec<ProviderInstance>>);

impl ProviderCatalog for StaticCatalog {
    fn snapshot(&self) -> Arc<Vec<ProviderInstance>> {
        Arc::clone(&self.0)
    }
}

/// Calls adapters directly, without retry or fallback
struct DirectInvoker {
    adapters: HashMap<String, Arc<dyn ProviderAdapter>>,
    discovery: DiscoveryRegistry,
}

impl DirectInvoker {
    fn adapter(&self, provider: &str) -> Result<&Arc<dyn ProviderAdapter>> {
        self.adapters
            .get(provider)
            .ok_or_else(|| Error::not_found(format!("adapter {}", provider)))
    }
}

#[async_trait]
impl ProviderInvoker for DirectInvoker {
    async fn create(
        &self,
        request: &ProvisionRequest,
        selection: &ProviderSelectionResult,
    ) -> Result<CreateOutcome> {
        let handle = self.adapter(&selection.provider_name)?.create(request).await?;
        Ok(CreateOutcome {
            provider_name: selection.provider_name.clone(),
            provider_type: selection.provider_type.clone(),
            handle,
            attempts: 1,
            fell_back: false,
        })
    }

    async fn discover(
        &self,
        provider: &str,
        handle: &ResourceHandle,
        cancel: &CancellationToken,
    ) -> Result<DiscoveryResult> {
        let strategy = self.discovery.get(handle.api)?;
        strategy.discover(&**self.adapter(provider)?, handle, cancel).await
    }

    async fn terminate(&self, provider: &str, target: &TerminationTarget) -> Result<()> {
        self.adapter(provider)?.terminate(target).await
    }
}

/// Simulates a concurrent writer touching the request right before the
/// orchestrator's next update
struct InterferingRequests {
    inner: InMemoryRequestRepository,
    interfere: AtomicBool,
}

#[async_trait]
impl RequestRepository for InterferingRequests {
    async fn save(&self, request: &Request) -> Result<Request> {
        self.inner.save(request).await
    }

    async fn get(&self, request_id: &RequestId) -> Result<Option<Request>> {
        self.inner.get(request_id).await
    }

    async fn update(&self, request: &Request) -> Result<Request> {
        if self.interfere.swap(false, Ordering::SeqCst) {
            if let Some(current) = self.inner.get(&request.request_id).await? {
                self.inner.update(&current).await?;
            }
        }
        self.inner.update(request).await
    }

    async fn query(&self, filter: &RequestFilter) -> Result<Vec<Request>> {
        self.inner.query(filter).await
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    orchestrator: RequestOrchestrator,
    adapter: Arc<InMemoryCloudAdapter>,
    clock: Arc<ManualClock>,
    requests: Arc<InterferingRequests>,
    templates: Arc<InMemoryTemplateRepository>,
}

fn harness(adapter: InMemoryCloudAdapter, policy: ReconciliationPolicy) -> Harness {
    let adapter = Arc::new(adapter);
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
    ));
    let requests = Arc::new(InterferingRequests {
        inner: InMemoryRequestRepository::new(),
        interfere: AtomicBool::new(false),
    });
    let templates = Arc::new(InMemoryTemplateRepository::new());

    let mut adapters: HashMap<String, Arc<dyn ProviderAdapter>> = HashMap::new();
    adapters.insert("aws-east".to_string(), adapter.clone());

    let orchestrator = RequestOrchestrator::new(OrchestratorComponents {
        catalog: Arc::new(StaticCatalog(Arc::new(vec![
            ProviderInstance::new("aws-east", "aws"),
            ProviderInstance::new("aws-off", "aws").with_enabled(false),
        ]))),
        selector: ProviderSelector::new(SelectionPolicy::Priority, None, Arc::new(SeededRandom::new(7))),
        validator: CapabilityValidator::new(ValidationLevel::Lenient),
        invoker: Arc::new(DirectInvoker {
            adapters,
            discovery: default_discovery_registry(),
        }),
        requests: requests.clone(),
        machines: Arc::new(InMemoryMachineRepository::new()),
        templates: templates.clone(),
        clock: clock.clone(),
        policy,
    });

    Harness {
        orchestrator,
        adapter,
        clock,
        requests,
        templates,
    }
}

fn manual() -> InMemoryCloudAdapter {
    InMemoryCloudAdapter::new("aws-east").with_mode(FulfillmentMode::Manual)
}

fn fleet_template() -> Template {
    Template::new("fleet-tpl").with_provider_api(ProviderApi::EC2Fleet)
}

// ============================================================================
// Creation
// ============================================================================

#[tokio::test]
async fn test_fleet_request_completes_as_capacity_arrives() {
    let h = harness(manual(), ReconciliationPolicy::default());
    h.adapter.queue_handle_id("fleet-abc");

    let id = h
        .orchestrator
        .create_request_from_template(&fleet_template(), 5)
        .await
        .expect("create");
    let view = h.orchestrator.get_request_status(&id).await.expect("status");
    assert_eq!(view.status, RequestStatus::InProgress);
    assert_eq!(view.resource_handles, vec!["fleet-abc".to_string()]);
    assert_eq!(view.provider_name.as_deref(), Some("aws-east"));

    h.adapter.fulfil("fleet-abc", 3).expect("fulfil");
    let status = h.orchestrator.reconcile(&id).await.expect("reconcile");
    assert_eq!(status, RequestStatus::InProgress);
    let view = h.orchestrator.get_request_status(&id).await.expect("status");
    assert_eq!(view.machines.len(), 3);
    assert_eq!(view.running_count, 3);

    h.adapter.fulfil("fleet-abc", 5).expect("fulfil");
    let status = h.orchestrator.reconcile(&id).await.expect("reconcile");
    assert_eq!(status, RequestStatus::Completed);
    let view = h.orchestrator.get_request_status(&id).await.expect("status");
    assert_eq!(view.machines.len(), 5);
    assert!(view.machines.iter().all(|m| m.status == MachineStatus::Running));
    assert!(view.completed_at.is_some());
}

#[tokio::test]
async fn test_create_by_template_id() {
    let h = harness(InMemoryCloudAdapter::new("aws-east"), ReconciliationPolicy::default());
    h.templates.save(&fleet_template()).await.expect("save template");

    let id = h
        .orchestrator
        .create_request("fleet-tpl", 2)
        .await
        .expect("create");
    let view = h.orchestrator.get_request_status(&id).await.expect("status");
    assert_eq!(view.template_id, "fleet-tpl");
    assert_eq!(view.requested_count, 2);

    let err = h
        .orchestrator
        .create_request("missing", 1)
        .await
        .expect_err("unknown template");
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn test_permanent_create_error_fails_request_without_machines() {
    let h = harness(manual(), ReconciliationPolicy::default());
    h.adapter.fail_next(Operation::Create, ProviderErrorKind::Permanent, 1);

    let id = h
        .orchestrator
        .create_request_from_template(&fleet_template(), 2)
        .await
        .expect("request is still created");
    let view = h.orchestrator.get_request_status(&id).await.expect("status");
    assert_eq!(view.status, RequestStatus::Failed);
    assert!(view.machines.is_empty());
    assert!(view.last_error.is_some());
    assert_eq!(view.provider_name.as_deref(), Some("aws-east"));
}

#[tokio::test]
async fn test_creation_time_errors_are_synchronous() {
    let h = harness(manual(), ReconciliationPolicy::default());

    let err = h
        .orchestrator
        .create_request_from_template(&fleet_template(), 0)
        .await
        .expect_err("zero count");
    assert!(matches!(err, Error::InvalidArgument { .. }));

    let disabled = fleet_template().with_provider_name("aws-off");
    let err = h
        .orchestrator
        .create_request_from_template(&disabled, 1)
        .await
        .expect_err("disabled provider");
    assert!(matches!(err, Error::Selection(_)));

    let too_many = h
        .orchestrator
        .create_request_from_template(&fleet_template(), 5000)
        .await
        .expect_err("over limit");
    assert!(matches!(too_many, Error::Validation { .. }));

    let listed = h
        .orchestrator
        .list_requests(&RequestFilter::all())
        .await
        .expect("list");
    assert!(listed.is_empty());
    assert_eq!(h.adapter.call_count(Operation::Create), 0);
}

// ============================================================================
// Reconciliation
// ============================================================================

#[tokio::test]
async fn test_terminal_requests_are_never_reconciled_again() {
    let h = harness(InMemoryCloudAdapter::new("aws-east"), ReconciliationPolicy::default());
    let id = h
        .orchestrator
        .create_request_from_template(&fleet_template(), 2)
        .await
        .expect("create");
    assert_eq!(
        h.orchestrator.reconcile(&id).await.expect("reconcile"),
        RequestStatus::Completed
    );
    let before = h.orchestrator.get_request_status(&id).await.expect("status");
    let calls = h.adapter.call_count(Operation::ListMembers);

    for _ in 0..3 {
        assert_eq!(
            h.orchestrator.reconcile(&id).await.expect("reconcile"),
            RequestStatus::Completed
        );
    }
    let after = h.orchestrator.get_request_status(&id).await.expect("status");
    assert_eq!(before, after);
    assert_eq!(h.adapter.call_count(Operation::ListMembers), calls);
}

#[tokio::test]
async fn test_repeated_reconcile_without_change_is_idempotent() {
    let h = harness(manual(), ReconciliationPolicy::default());
    h.adapter.queue_handle_id("fleet-1");
    let id = h
        .orchestrator
        .create_request_from_template(&fleet_template(), 4)
        .await
        .expect("create");
    h.adapter.fulfil("fleet-1", 2).expect("fulfil");

    h.orchestrator.reconcile(&id).await.expect("reconcile");
    let first = h.orchestrator.get_request_status(&id).await.expect("status");
    h.orchestrator.reconcile(&id).await.expect("reconcile");
    let second = h.orchestrator.get_request_status(&id).await.expect("status");

    assert_eq!(first, second);
    assert_eq!(second.machines.len(), 2);
}

#[tokio::test]
async fn test_machines_beyond_requested_count_are_not_recorded() {
    let h = harness(manual(), ReconciliationPolicy::default());
    h.adapter.queue_handle_id("fleet-big");
    let id = h
        .orchestrator
        .create_request_from_template(&fleet_template(), 3)
        .await
        .expect("create");
    h.adapter.fulfil("fleet-big", 5).expect("fulfil");

    let status = h.orchestrator.reconcile(&id).await.expect("reconcile");
    assert_eq!(status, RequestStatus::Completed);
    let view = h.orchestrator.get_request_status(&id).await.expect("status");
    assert_eq!(view.machines.len(), 3);
}

#[tokio::test]
async fn test_replaced_group_members_are_retired_and_do_not_hold_slots() {
    let h = harness(manual(), ReconciliationPolicy::default());
    h.adapter.queue_handle_id("asg-r");
    let template = Template::new("asg").with_provider_api(ProviderApi::ASG);
    let id = h
        .orchestrator
        .create_request_from_template(&template, 3)
        .await
        .expect("create");
    h.adapter.fulfil("asg-r", 2).expect("fulfil");
    assert_eq!(
        h.orchestrator.reconcile(&id).await.expect("reconcile"),
        RequestStatus::InProgress
    );
    let replaced = h.adapter.members("asg-r")[0].clone();

    h.adapter
        .set_instance_state(&replaced, InstanceState::Terminated)
        .expect("terminate member");
    h.adapter.fulfil("asg-r", 3).expect("fulfil");
    let status = h.orchestrator.reconcile(&id).await.expect("reconcile");

    let running_on_provider: Vec<String> = h
        .adapter
        .members("asg-r")
        .into_iter()
        .filter(|m| h.adapter.instance_state(m) == Some(InstanceState::Running))
        .collect();
    assert_eq!(running_on_provider.len(), 3);

    let view = h.orchestrator.get_request_status(&id).await.expect("status");
    let retired = view
        .machines
        .iter()
        .find(|m| m.machine_id == replaced)
        .expect("replaced member still recorded");
    assert_eq!(retired.status, MachineStatus::Terminated);
    assert_eq!(view.running_count, 3);
    let mut running_recorded: Vec<String> = view
        .machines
        .iter()
        .filter(|m| m.status == MachineStatus::Running)
        .map(|m| m.machine_id.clone())
        .collect();
    running_recorded.sort();
    let mut expected = running_on_provider;
    expected.sort();
    assert_eq!(running_recorded, expected);
    assert_eq!(status, RequestStatus::Completed);
}

#[tokio::test]
async fn test_group_is_not_completed_by_stale_members() {
    let h = harness(manual(), ReconciliationPolicy::default());
    h.adapter.queue_handle_id("asg-s");
    let template = Template::new("asg").with_provider_api(ProviderApi::ASG);
    let id = h
        .orchestrator
        .create_request_from_template(&template, 3)
        .await
        .expect("create");
    h.adapter.fulfil("asg-s", 2).expect("fulfil");
    h.orchestrator.reconcile(&id).await.expect("reconcile");

    let replaced = h.adapter.members("asg-s")[0].clone();
    h.adapter
        .set_instance_state(&replaced, InstanceState::Terminated)
        .expect("terminate member");
    h.adapter.fulfil("asg-s", 2).expect("replace member");
    h.adapter.set_fulfilled("asg-s", false).expect("unsettle");

    let status = h.orchestrator.reconcile(&id).await.expect("reconcile");
    assert_eq!(status, RequestStatus::InProgress);
    let view = h.orchestrator.get_request_status(&id).await.expect("status");
    assert_eq!(view.running_count, 2);
    assert_eq!(view.machines.len(), 3);
}

#[tokio::test]
async fn test_vanished_resource_fails_request() {
    let h = harness(manual(), ReconciliationPolicy::default());
    h.adapter.queue_handle_id("sfr-gone");
    let template = Template::new("spot").with_provider_api(ProviderApi::SpotFleet);
    let id = h
        .orchestrator
        .create_request_from_template(&template, 2)
        .await
        .expect("create");
    h.adapter.delete_resource("sfr-gone");

    let status = h.orchestrator.reconcile(&id).await.expect("reconcile");
    assert_eq!(status, RequestStatus::Failed);
    let view = h.orchestrator.get_request_status(&id).await.expect("status");
    assert!(view.last_error.unwrap_or_default().contains("sfr-gone"));
}

#[tokio::test]
async fn test_transient_discovery_failures_are_retried_next_cycle() {
    let h = harness(manual(), ReconciliationPolicy::default());
    h.adapter.queue_handle_id("fleet-t");
    let id = h
        .orchestrator
        .create_request_from_template(&fleet_template(), 2)
        .await
        .expect("create");
    h.adapter.fulfil("fleet-t", 2).expect("fulfil");
    h.adapter.fail_next(Operation::ListMembers, ProviderErrorKind::Transient, 2);

    for _ in 0..2 {
        assert_eq!(
            h.orchestrator.reconcile(&id).await.expect("reconcile"),
            RequestStatus::InProgress
        );
    }
    let view = h.orchestrator.get_request_status(&id).await.expect("status");
    assert!(view.last_error.is_some());

    assert_eq!(
        h.orchestrator.reconcile(&id).await.expect("reconcile"),
        RequestStatus::Completed
    );
}

#[tokio::test]
async fn test_consecutive_failed_polls_fail_request() {
    let policy = ReconciliationPolicy {
        max_failed_polls: 2,
        ..ReconciliationPolicy::default()
    };
    let h = harness(manual(), policy);
    h.adapter.queue_handle_id("fleet-flaky");
    let id = h
        .orchestrator
        .create_request_from_template(&fleet_template(), 2)
        .await
        .expect("create");
    h.adapter.fail_next(Operation::ListMembers, ProviderErrorKind::Transient, 2);

    assert_eq!(
        h.orchestrator.reconcile(&id).await.expect("reconcile"),
        RequestStatus::InProgress
    );
    assert_eq!(
        h.orchestrator.reconcile(&id).await.expect("reconcile"),
        RequestStatus::Failed
    );
    assert!(!h.adapter.has_resource("fleet-flaky"));
}

#[tokio::test]
async fn test_settled_shortfall_fails_by_default() {
    let h = harness(manual(), ReconciliationPolicy::default());
    h.adapter.queue_handle_id("sfr-short");
    let template = Template::new("spot").with_provider_api(ProviderApi::SpotFleet);
    let id = h
        .orchestrator
        .create_request_from_template(&template, 4)
        .await
        .expect("create");
    h.adapter.fulfil("sfr-short", 2).expect("fulfil");
    h.adapter.set_fulfilled("sfr-short", true).expect("settle");

    let status = h.orchestrator.reconcile(&id).await.expect("reconcile");
    assert_eq!(status, RequestStatus::Failed);
    assert!(!h.adapter.has_resource("sfr-short"));
}

#[tokio::test]
async fn test_settled_shortfall_completes_when_partial_is_accepted() {
    let policy = ReconciliationPolicy {
        partial_fulfillment: PartialFulfillmentPolicy::AcceptPartial,
        ..ReconciliationPolicy::default()
    };
    let h = harness(manual(), policy);
    h.adapter.queue_handle_id("sfr-short");
    let template = Template::new("spot").with_provider_api(ProviderApi::SpotFleet);
    let id = h
        .orchestrator
        .create_request_from_template(&template, 4)
        .await
        .expect("create");
    h.adapter.fulfil("sfr-short", 2).expect("fulfil");
    h.adapter.set_fulfilled("sfr-short", true).expect("settle");

    let status = h.orchestrator.reconcile(&id).await.expect("reconcile");
    assert_eq!(status, RequestStatus::Completed);
    let view = h.orchestrator.get_request_status(&id).await.expect("status");
    assert_eq!(view.running_count, 2);
    assert!(h.adapter.has_resource("sfr-short"));
}

#[tokio::test]
async fn test_elapsed_timeout_times_out_and_releases_resources() {
    let h = harness(manual(), ReconciliationPolicy::default());
    h.adapter.queue_handle_id("asg-slow");
    let template = Template::new("asg").with_provider_api(ProviderApi::ASG);
    let id = h
        .orchestrator
        .create_request_from_template(&template, 3)
        .await
        .expect("create");

    h.clock.advance(Duration::from_secs(1801));
    let status = h.orchestrator.reconcile(&id).await.expect("reconcile");
    assert_eq!(status, RequestStatus::Timeout);
    assert!(!h.adapter.has_resource("asg-slow"));
    let view = h.orchestrator.get_request_status(&id).await.expect("status");
    assert!(view.completed_at.is_some());
}

#[tokio::test]
async fn test_pending_request_past_timeout_times_out() {
    let h = harness(manual(), ReconciliationPolicy::default());
    let pending = Request::new_at(&fleet_template(), 2, h.clock.now());
    let id = h.requests.save(&pending).await.expect("save").request_id;

    h.clock.advance(Duration::from_secs(1801));
    let status = h.orchestrator.reconcile(&id).await.expect("reconcile");
    assert_eq!(status, RequestStatus::Timeout);
    let view = h.orchestrator.get_request_status(&id).await.expect("status");
    assert_eq!(view.status, RequestStatus::Timeout);
    assert_eq!(h.adapter.call_count(Operation::ListMembers), 0);
    assert_eq!(h.orchestrator.tracked_cancellations(), 0);
}

#[tokio::test]
async fn test_timeout_with_running_subset_completes_when_partial_is_accepted() {
    let policy = ReconciliationPolicy {
        partial_fulfillment: PartialFulfillmentPolicy::AcceptPartial,
        request_timeout: Duration::from_secs(60),
        ..ReconciliationPolicy::default()
    };
    let h = harness(manual(), policy);
    h.adapter.queue_handle_id("fleet-part");
    let id = h
        .orchestrator
        .create_request_from_template(&fleet_template(), 3)
        .await
        .expect("create");
    h.adapter.fulfil("fleet-part", 1).expect("fulfil");
    assert_eq!(
        h.orchestrator.reconcile(&id).await.expect("reconcile"),
        RequestStatus::InProgress
    );

    h.clock.advance(Duration::from_secs(61));
    assert_eq!(
        h.orchestrator.reconcile(&id).await.expect("reconcile"),
        RequestStatus::Completed
    );
}

#[tokio::test]
async fn test_version_conflict_reloads_and_retries() {
    let h = harness(manual(), ReconciliationPolicy::default());
    h.adapter.queue_handle_id("fleet-race");
    let id = h
        .orchestrator
        .create_request_from_template(&fleet_template(), 2)
        .await
        .expect("create");
    h.adapter.fulfil("fleet-race", 2).expect("fulfil");

    h.requests.interfere.store(true, Ordering::SeqCst);
    let status = h.orchestrator.reconcile(&id).await.expect("reconcile");
    assert_eq!(status, RequestStatus::Completed);

    let view = h.orchestrator.get_request_status(&id).await.expect("status");
    assert_eq!(view.machines.len(), 2);
    let stored = h
        .requests
        .get(&id)
        .await
        .expect("get")
        .expect("exists");
    assert_eq!(stored.machine_ids.len(), 2);
}

// ============================================================================
// Cancellation and listing
// ============================================================================

#[tokio::test]
async fn test_cancel_releases_resources_and_stops_reconciliation() {
    let h = harness(manual(), ReconciliationPolicy::default());
    h.adapter.queue_handle_id("fleet-c");
    let id = h
        .orchestrator
        .create_request_from_template(&fleet_template(), 2)
        .await
        .expect("create");
    h.adapter.fulfil("fleet-c", 1).expect("fulfil");
    h.orchestrator.reconcile(&id).await.expect("reconcile");

    h.orchestrator.cancel_request(&id).await.expect("cancel");
    assert!(!h.adapter.has_resource("fleet-c"));
    let view = h.orchestrator.get_request_status(&id).await.expect("status");
    assert_eq!(view.status, RequestStatus::Cancelled);
    assert!(view.machines.iter().all(|m| m.status == MachineStatus::Terminating));

    let calls = h.adapter.call_count(Operation::ListMembers);
    assert_eq!(
        h.orchestrator.reconcile(&id).await.expect("reconcile"),
        RequestStatus::Cancelled
    );
    assert_eq!(h.adapter.call_count(Operation::ListMembers), calls);

    let err = h
        .orchestrator
        .cancel_request(&id)
        .await
        .expect_err("already cancelled");
    assert!(matches!(err, Error::InvalidState { .. }));
}

#[tokio::test]
async fn test_cancellation_tokens_are_dropped_once_terminal() {
    let h = harness(manual(), ReconciliationPolicy::default());
    h.adapter.queue_handle_id("fleet-d");
    let done = h
        .orchestrator
        .create_request_from_template(&fleet_template(), 1)
        .await
        .expect("create");
    let cancelled = h
        .orchestrator
        .create_request_from_template(&fleet_template(), 1)
        .await
        .expect("create");

    h.orchestrator.reconcile(&done).await.expect("reconcile");
    assert_eq!(h.orchestrator.tracked_cancellations(), 1);
    h.adapter.fulfil("fleet-d", 1).expect("fulfil");
    assert_eq!(
        h.orchestrator.reconcile(&done).await.expect("reconcile"),
        RequestStatus::Completed
    );
    assert_eq!(h.orchestrator.tracked_cancellations(), 0);

    h.orchestrator.reconcile(&cancelled).await.expect("reconcile");
    h.orchestrator.cancel_request(&cancelled).await.expect("cancel");
    assert_eq!(h.orchestrator.tracked_cancellations(), 0);
    assert_eq!(
        h.orchestrator.reconcile(&cancelled).await.expect("reconcile"),
        RequestStatus::Cancelled
    );
    assert_eq!(h.orchestrator.tracked_cancellations(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_listing_skips_describe_and_machine_writes() {
    let h = harness(manual().with_latency(Duration::from_millis(100)), ReconciliationPolicy::default());
    h.adapter.queue_handle_id("fleet-slow");
    let id = h
        .orchestrator
        .create_request_from_template(&fleet_template(), 2)
        .await
        .expect("create");
    h.adapter.fulfil("fleet-slow", 2).expect("fulfil");

    let (reconciled, cancelled) = tokio::join!(h.orchestrator.reconcile(&id), async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        h.orchestrator.cancel_request(&id).await
    });

    cancelled.expect("cancel");
    assert_eq!(reconciled.expect("reconcile"), RequestStatus::Cancelled);
    assert_eq!(h.adapter.call_count(Operation::ListMembers), 1);
    assert_eq!(h.adapter.call_count(Operation::DescribeInstances), 0);
    let view = h.orchestrator.get_request_status(&id).await.expect("status");
    assert_eq!(view.status, RequestStatus::Cancelled);
    assert!(view.machines.is_empty());
    assert_eq!(h.orchestrator.tracked_cancellations(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_describe_records_no_machines() {
    let h = harness(manual().with_latency(Duration::from_millis(100)), ReconciliationPolicy::default());
    h.adapter.queue_handle_id("fleet-slow");
    let id = h
        .orchestrator
        .create_request_from_template(&fleet_template(), 2)
        .await
        .expect("create");
    h.adapter.fulfil("fleet-slow", 2).expect("fulfil");

    let (reconciled, cancelled) = tokio::join!(h.orchestrator.reconcile(&id), async {
        tokio::time::sleep(Duration::from_millis(150)).await;
        h.orchestrator.cancel_request(&id).await
    });

    cancelled.expect("cancel");
    assert_eq!(reconciled.expect("reconcile"), RequestStatus::Cancelled);
    assert_eq!(h.adapter.call_count(Operation::DescribeInstances), 1);
    let view = h.orchestrator.get_request_status(&id).await.expect("status");
    assert!(view.machines.is_empty());
    let stored = h.requests.get(&id).await.expect("get").expect("exists");
    assert!(stored.machine_ids.is_empty());
}

#[tokio::test]
async fn test_cleanup_failure_does_not_block_cancel() {
    let h = harness(manual(), ReconciliationPolicy::default());
    let id = h
        .orchestrator
        .create_request_from_template(&fleet_template(), 2)
        .await
        .expect("create");
    h.adapter.fail_next(Operation::Terminate, ProviderErrorKind::Permanent, 2);

    h.orchestrator.cancel_request(&id).await.expect("cancel");
    let view = h.orchestrator.get_request_status(&id).await.expect("status");
    assert_eq!(view.status, RequestStatus::Cancelled);
}

#[tokio::test]
async fn test_unknown_request_is_not_found() {
    let h = harness(manual(), ReconciliationPolicy::default());
    let unknown = RequestId::from("req-missing");
    assert!(matches!(
        h.orchestrator.get_request_status(&unknown).await,
        Err(Error::NotFound { .. })
    ));
    assert!(matches!(
        h.orchestrator.cancel_request(&unknown).await,
        Err(Error::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_list_requests_filters_by_status() {
    let h = harness(manual(), ReconciliationPolicy::default());
    let active = h
        .orchestrator
        .create_request_from_template(&fleet_template(), 1)
        .await
        .expect("create");
    h.clock.advance(Duration::from_secs(1));
    let cancelled = h
        .orchestrator
        .create_request_from_template(&fleet_template(), 1)
        .await
        .expect("create");
    h.orchestrator.cancel_request(&cancelled).await.expect("cancel");

    let all = h
        .orchestrator
        .list_requests(&RequestFilter::all())
        .await
        .expect("list");
    let ids: Vec<RequestId> = all.into_iter().map(|v| v.request_id).collect();
    assert_eq!(ids, vec![active.clone(), cancelled]);

    let running = h
        .orchestrator
        .list_requests(&RequestFilter::active())
        .await
        .expect("list");
    assert_eq!(running.len(), 1);
    assert_eq!(running[0].request_id, active);
}
