//! Request Orchestrator Use Case
//!
//! Sequences selection, validation, provisioning, reconciliation and
//! termination for each request:
//!
//! ```text
//! PENDING ──create ok──▶ IN_PROGRESS ──all running──▶ COMPLETED
//!    │                       │ ├──vanished / permanent / partial──▶ FAILED
//!    │                       │ └──elapsed > timeout──▶ TIMEOUT
//!    ├──create failed──▶ FAILED
//!    ├──elapsed > timeout──▶ TIMEOUT
//!    └──cancel──▶ CANCELLED ◀──cancel──┘
//! ```
//!
//! Terminal requests are never touched again: reconciliation returns their
//! status without calling a provider. Every persisted write is versioned;
//! a conflict reloads the request and repeats the step.
//!
//! Each non-terminal request being reconciled or cancelled holds a
//! `CancellationToken`. Cancelling fires it, so a cycle already in flight
//! skips its remaining provider calls and machine writes. The token is
//! dropped once the request is terminal.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use orb_domain::entities::{Machine, Request, Template};
use orb_domain::error::{Error, Result, SelectionError};
use orb_domain::ports::{Clock, ProvisionRequest, TerminationTarget};
use orb_domain::repositories::{MachineRepository, RequestRepository, TemplateRepository};
use orb_domain::value_objects::{
    InstanceDescriptor, MachineStatus, ProviderSelectionResult, RequestFilter, RequestId,
    RequestStatus, RequestView, ResourceHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain_services::reconciliation::{
    Assessment, FulfillmentSnapshot, ReconciliationPolicy, assess,
};
use crate::domain_services::selection::ProviderSelector;
use crate::domain_services::validation::CapabilityValidator;
use crate::ports::catalog::ProviderCatalog;
use crate::ports::invoker::{CreateOutcome, ProviderInvoker};
use crate::ports::services::RequestOrchestratorInterface;

/// Collaborators injected into the orchestrator
pub struct OrchestratorComponents {
    /// Provider registry snapshot source
    pub catalog: Arc<dyn ProviderCatalog>,
    /// Provider selection
    pub selector: ProviderSelector,
    /// Capability validation
    pub validator: CapabilityValidator,
    /// Resilient provider calls
    pub invoker: Arc<dyn ProviderInvoker>,
    /// Request storage
    pub requests: Arc<dyn RequestRepository>,
    /// Machine storage
    pub machines: Arc<dyn MachineRepository>,
    /// Template storage
    pub templates: Arc<dyn TemplateRepository>,
    /// Time source
    pub clock: Arc<dyn Clock>,
    /// Reconciliation tuning
    pub policy: ReconciliationPolicy,
}

/// Request lifecycle state machine
pub struct RequestOrchestrator {
    catalog: Arc<dyn ProviderCatalog>,
    selector: ProviderSelector,
    validator: CapabilityValidator,
    invoker: Arc<dyn ProviderInvoker>,
    requests: Arc<dyn RequestRepository>,
    machines: Arc<dyn MachineRepository>,
    templates: Arc<dyn TemplateRepository>,
    clock: Arc<dyn Clock>,
    policy: ReconciliationPolicy,
    cancellations: DashMap<RequestId, CancellationToken>,
}

impl RequestOrchestrator {
    /// Create an orchestrator from its collaborators
    pub fn new(components: OrchestratorComponents) -> Self {
        Self {
            catalog: components.catalog,
            selector: components.selector,
            validator: components.validator,
            invoker: components.invoker,
            requests: components.requests,
            machines: components.machines,
            templates: components.templates,
            clock: components.clock,
            policy: components.policy,
            cancellations: DashMap::new(),
        }
    }

    /// Reconciliation tuning in use
    pub fn policy(&self) -> &ReconciliationPolicy {
        &self.policy
    }

    async fn load(&self, request_id: &RequestId) -> Result<Request> {
        self.requests
            .get(request_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("request {}", request_id)))
    }

    /// Number of requests currently holding a cancellation token
    pub fn tracked_cancellations(&self) -> usize {
        self.cancellations.len()
    }

    fn cancellation(&self, request_id: &RequestId) -> CancellationToken {
        self.cancellations
            .entry(request_id.clone())
            .or_default()
            .clone()
    }

    fn forget(&self, request_id: &RequestId) {
        self.cancellations.remove(request_id);
    }

    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    async fn create(&self, template: &Template, count: u32) -> Result<RequestId> {
        if count == 0 {
            return Err(Error::invalid_argument(
                "requested instance count must be greater than zero",
            ));
        }

        let providers = self.catalog.snapshot();
        let selection = self.selector.select(template, count, &providers)?;
        let provider = providers
            .iter()
            .find(|p| p.name == selection.provider_name)
            .ok_or_else(|| SelectionError::ProviderNotFound {
                name: selection.provider_name.clone(),
            })?;
        let report = self
            .validator
            .validate(template, count, provider)
            .into_result()?;
        for warning in &report.warnings {
            warn!(
                template_id = %template.template_id,
                provider = %provider.name,
                "Template validation warning: {}",
                warning
            );
        }

        let request = self
            .requests
            .save(&Request::new_at(template, count, self.clock.now()))
            .await?;
        let request_id = request.request_id.clone();
        info!(
            request_id = %request_id,
            template_id = %template.template_id,
            provider = %selection.provider_name,
            policy = %selection.policy,
            confidence = selection.confidence,
            "Request created"
        );

        let provision = ProvisionRequest {
            request_id: request_id.clone(),
            template: template.clone(),
            count,
        };
        let outcome = self.invoker.create(&provision, &selection).await;
        self.record_create_outcome(request, &selection, outcome)
            .await?;
        Ok(request_id)
    }

    async fn record_create_outcome(
        &self,
        mut request: Request,
        selection: &ProviderSelectionResult,
        outcome: Result<CreateOutcome>,
    ) -> Result<()> {
        let mut conflicts = 0;
        loop {
            if request.is_terminal() {
                // Cancelled while the create call was in flight
                if let Ok(created) = &outcome {
                    warn!(
                        request_id = %request.request_id,
                        status = %request.status,
                        handle = %created.handle,
                        "Request ended during create; releasing created resource"
                    );
                    self.terminate_handle(&created.provider_name, &created.handle, &[])
                        .await;
                }
                return Ok(());
            }

            let now = self.clock.now();
            match &outcome {
                Ok(created) => {
                    let reason = if created.fell_back {
                        format!(
                            "fallback from '{}' ({})",
                            selection.provider_name, selection.reason
                        )
                    } else {
                        selection.reason.clone()
                    };
                    request.bind_provider(
                        &created.provider_name,
                        &created.provider_type,
                        Some(reason),
                    )?;
                    request.start(vec![created.handle.clone()], now)?;
                }
                Err(e) => {
                    request.bind_provider(
                        &selection.provider_name,
                        &selection.provider_type,
                        Some(selection.reason.clone()),
                    )?;
                    request.fail(e.to_string(), now)?;
                }
            }

            match self.requests.update(&request).await {
                Ok(stored) => {
                    match &outcome {
                        Ok(created) => info!(
                            request_id = %stored.request_id,
                            provider = %created.provider_name,
                            handle = %created.handle,
                            attempts = created.attempts,
                            "Provider resources created"
                        ),
                        Err(e) => warn!(
                            request_id = %stored.request_id,
                            provider = %selection.provider_name,
                            error = %e,
                            "Provider create failed; request failed"
                        ),
                    }
                    return Ok(());
                }
                Err(e) if e.is_version_conflict() && conflicts < self.policy.version_conflict_retries => {
                    conflicts += 1;
                    request = self.load(&request.request_id).await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    // ------------------------------------------------------------------
    // Reconcile
    // ------------------------------------------------------------------

    async fn reconcile_with_retry(&self, request_id: &RequestId) -> Result<RequestStatus> {
        // Taken before the first load so a cancel racing this cycle is seen
        let token = self.cancellation(request_id);
        let mut conflicts = 0;
        let outcome = loop {
            match self.reconcile_once(request_id, &token).await {
                Err(e) if e.is_version_conflict() && conflicts < self.policy.version_conflict_retries => {
                    conflicts += 1;
                    debug!(request_id = %request_id, attempt = conflicts, "Version conflict; reloading request");
                }
                Err(e) if e.is_cancelled() => {
                    info!(request_id = %request_id, error = %e, "Cancellation recorded; ending reconciliation cycle");
                    break self.load(request_id).await.map(|r| r.status);
                }
                other => break other,
            }
        };

        match &outcome {
            Ok(status) if status.is_terminal() => self.forget(request_id),
            Err(Error::NotFound { .. }) => self.forget(request_id),
            _ => {}
        }
        outcome
    }

    async fn reconcile_once(
        &self,
        request_id: &RequestId,
        token: &CancellationToken,
    ) -> Result<RequestStatus> {
        let original = self.load(request_id).await?;
        if original.is_terminal() {
            return Ok(original.status);
        }

        let now = self.clock.now();
        let timed_out = original.is_timed_out(now, self.policy.request_timeout);
        let mut request = original.clone();

        if request.status == RequestStatus::Pending {
            if timed_out {
                request.time_out(now)?;
                self.requests.update(&request).await?;
                warn!(request_id = %request_id, "Pending request timed out");
            }
            return Ok(request.status);
        }

        let provider = request
            .provider_name
            .clone()
            .ok_or_else(|| Error::invalid_state(format!("request {} has no bound provider", request_id)))?;
        let mut machines = self.machines.list_by_request(request_id).await?;

        if timed_out {
            let snapshot = fulfillment(&request, &machines, false, true);
            let assessment = assess(&snapshot, &self.policy);
            return self
                .apply_assessment(request, &original, &provider, assessment, now)
                .await;
        }

        let total = request.resource_handles.len();
        let mut failed = 0usize;
        let mut last_failure = None;
        let mut settled = true;

        for handle in request.resource_handles.clone() {
            checkpoint(token, "discovery")?;

            match self.invoker.discover(&provider, &handle, token).await {
                Ok(result) => {
                    settled &= result.settled;
                    self.retire_missing(&mut machines, &handle, &result.instances, token, now)
                        .await?;
                    self.upsert_machines(
                        &mut request,
                        &mut machines,
                        &provider,
                        &handle,
                        &result.instances,
                        token,
                        now,
                    )
                    .await?;
                }
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) if e.is_permanent() => {
                    warn!(
                        request_id = %request_id,
                        provider = %provider,
                        handle = %handle,
                        error = %e,
                        "Discovery failed permanently"
                    );
                    request.fail(e.to_string(), now)?;
                    return self
                        .persist_terminal(request, &original, &provider, now)
                        .await;
                }
                Err(e) => {
                    debug!(
                        request_id = %request_id,
                        handle = %handle,
                        error = %e,
                        "Discovery failed; retrying next cycle"
                    );
                    failed += 1;
                    settled = false;
                    last_failure = Some(e.to_string());
                }
            }
        }

        if failed > 0 {
            let failure = Error::PartialDiscoveryFailure {
                failed,
                total,
                message: last_failure.unwrap_or_default(),
            };
            let polls = request.record_poll_failure(failure.to_string(), now);
            warn!(
                request_id = %request_id,
                consecutive_failures = polls,
                "{}",
                failure
            );
            if polls >= self.policy.max_failed_polls {
                request.fail(
                    format!("discovery failed {} consecutive times: {}", polls, failure),
                    now,
                )?;
                return self
                    .persist_terminal(request, &original, &provider, now)
                    .await;
            }
        } else {
            request.reset_poll_failures();
        }

        checkpoint(token, "request update")?;
        let snapshot = fulfillment(&request, &machines, settled, false);
        let assessment = assess(&snapshot, &self.policy);
        self.apply_assessment(request, &original, &provider, assessment, now)
            .await
    }

    /// Mark machines of `handle` that the provider no longer reports as terminated
    ///
    /// Groups drop replaced members from their listing, so absence after a
    /// successful poll is the only signal those machines are gone.
    async fn retire_missing(
        &self,
        machines: &mut [Machine],
        handle: &ResourceHandle,
        instances: &[InstanceDescriptor],
        token: &CancellationToken,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<()> {
        let gone = machines.iter_mut().filter(|m| {
            m.resource_handle == handle.id
                && !m.status.is_final()
                && !instances.iter().any(|d| d.instance_id == m.machine_id)
        });
        for machine in gone {
            checkpoint(token, "machine update")?;
            let previous = machine.status;
            machine.status = MachineStatus::Terminated;
            machine.updated_at = now;
            *machine = self.machines.update(&*machine).await?;
            info!(
                request_id = %machine.request_id,
                machine_id = %machine.machine_id,
                previous = %previous,
                "Machine no longer reported by provider; marked terminated"
            );
        }
        Ok(())
    }

    /// Insert new machines (up to the cap) and refresh known ones
    async fn upsert_machines(
        &self,
        request: &mut Request,
        machines: &mut Vec<Machine>,
        provider: &str,
        handle: &ResourceHandle,
        instances: &[InstanceDescriptor],
        token: &CancellationToken,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<()> {
        for descriptor in instances {
            if let Some(existing) = machines
                .iter_mut()
                .find(|m| m.machine_id == descriptor.instance_id)
            {
                if existing.apply_descriptor(descriptor, now) {
                    checkpoint(token, "machine update")?;
                    *existing = self.machines.update(&*existing).await?;
                }
                request.record_machine(&existing.machine_id);
                continue;
            }

            let live = machines.iter().filter(|m| !m.status.is_final()).count();
            if self
                .policy
                .admissible_new_machines(live, request.requested_count)
                == 0
            {
                debug!(
                    request_id = %request.request_id,
                    machine_id = %descriptor.instance_id,
                    "Instance beyond requested count not recorded"
                );
                continue;
            }

            let machine =
                Machine::from_descriptor(&request.request_id, &handle.id, provider, descriptor, now);
            checkpoint(token, "machine record")?;
            let stored = self.machines.save(&machine).await?;
            request.record_machine(&stored.machine_id);
            debug!(
                request_id = %request.request_id,
                machine_id = %stored.machine_id,
                status = %stored.status,
                "Machine recorded"
            );
            machines.push(stored);
        }
        Ok(())
    }

    async fn apply_assessment(
        &self,
        mut request: Request,
        original: &Request,
        provider: &str,
        assessment: Assessment,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<RequestStatus> {
        match assessment {
            Assessment::InProgress => {}
            Assessment::Complete => {
                request.complete(now)?;
                info!(
                    request_id = %request.request_id,
                    machines = request.machine_ids.len(),
                    "Request completed"
                );
                return self.persist(request, original, now).await;
            }
            Assessment::Fail(reason) => {
                warn!(request_id = %request.request_id, reason = %reason, "Request failed");
                request.fail(reason, now)?;
                return self.persist_terminal(request, original, provider, now).await;
            }
            Assessment::Timeout => {
                request.time_out(now)?;
                warn!(request_id = %request.request_id, "Request timed out");
                return self.persist_terminal(request, original, provider, now).await;
            }
        }
        self.persist(request, original, now).await
    }

    /// Write the request only if something changed
    async fn persist(
        &self,
        mut request: Request,
        original: &Request,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<RequestStatus> {
        if request != *original {
            request.updated_at = now;
            self.requests.update(&request).await?;
        }
        Ok(request.status)
    }

    /// Write a failed or timed-out request, then release its resources
    async fn persist_terminal(
        &self,
        request: Request,
        original: &Request,
        provider: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<RequestStatus> {
        let status = self.persist(request.clone(), original, now).await?;
        self.release_resources(provider, &request).await;
        Ok(status)
    }

    // ------------------------------------------------------------------
    // Termination
    // ------------------------------------------------------------------

    /// Best-effort termination of every resource of a request
    ///
    /// Failures are logged and never surfaced.
    async fn release_resources(&self, provider: &str, request: &Request) {
        if request.resource_handles.is_empty() {
            return;
        }
        let machines = match self.machines.list_by_request(&request.request_id).await {
            Ok(machines) => machines,
            Err(e) => {
                warn!(request_id = %request.request_id, error = %e, "Could not load machines for cleanup");
                Vec::new()
            }
        };

        for handle in &request.resource_handles {
            let owned: Vec<&Machine> = machines
                .iter()
                .filter(|m| m.resource_handle == handle.id)
                .collect();
            let instance_ids: Vec<String> = owned.iter().map(|m| m.machine_id.clone()).collect();
            if self.terminate_handle(provider, handle, &instance_ids).await {
                for machine in owned.into_iter().filter(|m| !m.status.is_final()) {
                    let mut machine = machine.clone();
                    machine.status = MachineStatus::Terminating;
                    machine.updated_at = self.clock.now();
                    if let Err(e) = self.machines.update(&machine).await {
                        debug!(machine_id = %machine.machine_id, error = %e, "Machine status not updated");
                    }
                }
            }
        }
    }

    /// Terminate a resource, falling back to its known instances
    ///
    /// Returns `true` if either call succeeded.
    async fn terminate_handle(
        &self,
        provider: &str,
        handle: &ResourceHandle,
        instance_ids: &[String],
    ) -> bool {
        let target = TerminationTarget::Resource(handle.clone());
        let error = match self.invoker.terminate(provider, &target).await {
            Ok(()) => {
                info!(provider = %provider, handle = %handle, "Resource terminated");
                return true;
            }
            Err(e) => e,
        };
        warn!(
            provider = %provider,
            handle = %handle,
            error = %error,
            "Resource termination failed"
        );

        if instance_ids.is_empty() {
            return false;
        }
        let target = TerminationTarget::Instances(instance_ids.to_vec());
        match self.invoker.terminate(provider, &target).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    provider = %provider,
                    handle = %handle,
                    instances = instance_ids.len(),
                    error = %e,
                    "Instance termination failed"
                );
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // Cancel
    // ------------------------------------------------------------------

    async fn cancel(&self, request_id: &RequestId) -> Result<()> {
        let request = self.load(request_id).await?;
        if request.is_terminal() {
            return Err(Error::invalid_state(format!(
                "request {} is already {}",
                request_id, request.status
            )));
        }

        // In-flight cycles keep their clone of the fired token after removal
        self.cancellation(request_id).cancel();
        let result = self.persist_cancel(request_id).await;
        self.forget(request_id);
        result
    }

    async fn persist_cancel(&self, request_id: &RequestId) -> Result<()> {
        let mut conflicts = 0;
        loop {
            let mut request = self.load(request_id).await?;
            if request.is_terminal() {
                return Err(Error::invalid_state(format!(
                    "request {} is already {}",
                    request_id, request.status
                )));
            }
            request.cancel(self.clock.now())?;
            match self.requests.update(&request).await {
                Ok(stored) => {
                    info!(request_id = %request_id, "Request cancelled");
                    if let Some(provider) = &stored.provider_name {
                        self.release_resources(provider, &stored).await;
                    }
                    return Ok(());
                }
                Err(e) if e.is_version_conflict() && conflicts < self.policy.version_conflict_retries => {
                    conflicts += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    async fn view(&self, request: &Request) -> Result<RequestView> {
        let machines = self.machines.list_by_request(&request.request_id).await?;
        Ok(RequestView::new(request, &machines))
    }
}

fn checkpoint(token: &CancellationToken, operation: &str) -> Result<()> {
    if token.is_cancelled() {
        return Err(Error::cancelled(operation));
    }
    Ok(())
}

/// Count running and pending machines of a request
fn fulfillment(
    request: &Request,
    machines: &[Machine],
    settled: bool,
    timed_out: bool,
) -> FulfillmentSnapshot {
    let count = |status: MachineStatus| {
        let n = machines.iter().filter(|m| m.status == status).count();
        u32::try_from(n).unwrap_or(u32::MAX)
    };
    FulfillmentSnapshot {
        requested: request.requested_count,
        running: count(MachineStatus::Running),
        pending: count(MachineStatus::Pending),
        settled,
        timed_out,
    }
}

#[async_trait]
impl RequestOrchestratorInterface for RequestOrchestrator {
    async fn create_request(&self, template_id: &str, count: u32) -> Result<RequestId> {
        let template = self
            .templates
            .get(template_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("template {}", template_id)))?;
        self.create(&template, count).await
    }

    async fn create_request_from_template(
        &self,
        template: &Template,
        count: u32,
    ) -> Result<RequestId> {
        self.create(template, count).await
    }

    async fn get_request_status(&self, request_id: &RequestId) -> Result<RequestView> {
        let request = self.load(request_id).await?;
        self.view(&request).await
    }

    async fn cancel_request(&self, request_id: &RequestId) -> Result<()> {
        self.cancel(request_id).await
    }

    async fn list_requests(&self, filter: &RequestFilter) -> Result<Vec<RequestView>> {
        let requests = self.requests.query(filter).await?;
        let mut views = Vec::with_capacity(requests.len());
        for request in &requests {
            views.push(self.view(request).await?);
        }
        Ok(views)
    }

    async fn reconcile(&self, request_id: &RequestId) -> Result<RequestStatus> {
        self.reconcile_with_retry(request_id).await
    }
}
