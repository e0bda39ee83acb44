//! Request entity
//!
//! A request moves through `PENDING -> IN_PROGRESS -> {COMPLETED, FAILED,
//! TIMEOUT}` or is cancelled while active. A pending request may also time
//! out. Terminal states have no outgoing transitions; every mutator below
//! rejects changes once the request is terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::template::Template;
use crate::error::{Error, Result};
use crate::value_objects::{ProviderApi, RequestId, RequestStatus, ResourceHandle};

/// Tracked unit of provisioning work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Request identifier
    pub request_id: RequestId,
    /// Template the request was created from
    pub template_id: String,
    /// Provisioning API taken from the template
    pub provider_api: ProviderApi,
    /// Provider type of the bound instance
    pub provider_type: Option<String>,
    /// Bound provider instance, set exactly once
    pub provider_name: Option<String>,
    /// Number of instances requested
    pub requested_count: u32,
    /// Lifecycle state
    pub status: RequestStatus,
    /// Provider resources created for this request
    pub resource_handles: Vec<ResourceHandle>,
    /// Machines recorded for this request, in discovery order
    pub machine_ids: Vec<String>,
    /// Reason the provider instance was chosen
    pub selection_reason: Option<String>,
    /// Last observed error
    pub last_error: Option<String>,
    /// Consecutive reconciliation polls that failed
    pub failed_polls: u32,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    /// Time the request reached a terminal state
    pub completed_at: Option<DateTime<Utc>>,
    /// Storage version
    pub version: u64,
}

impl Request {
    /// Create a pending request from a template
    pub fn new(template: &Template, requested_count: u32) -> Self {
        Self::new_at(template, requested_count, Utc::now())
    }

    /// Create a pending request at a given time
    pub fn new_at(template: &Template, requested_count: u32, now: DateTime<Utc>) -> Self {
        Self {
            request_id: RequestId::generate(),
            template_id: template.template_id.clone(),
            provider_api: template.effective_api(),
            provider_type: None,
            provider_name: None,
            requested_count,
            status: RequestStatus::Pending,
            resource_handles: Vec::new(),
            machine_ids: Vec::new(),
            selection_reason: None,
            last_error: None,
            failed_polls: 0,
            created_at: now,
            updated_at: now,
            completed_at: None,
            version: 0,
        }
    }

    /// Whether the request is in a terminal state
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Bind the provider instance that serves this request
    ///
    /// The binding is immutable: a second call fails with `InvalidState`.
    pub fn bind_provider<N: Into<String>, T: Into<String>>(
        &mut self,
        provider_name: N,
        provider_type: T,
        reason: Option<String>,
    ) -> Result<()> {
        if let Some(bound) = &self.provider_name {
            return Err(Error::invalid_state(format!(
                "request {} is already bound to provider '{}'",
                self.request_id, bound
            )));
        }
        self.provider_name = Some(provider_name.into());
        self.provider_type = Some(provider_type.into());
        self.selection_reason = reason;
        Ok(())
    }

    /// Apply a status transition
    pub fn transition(&mut self, next: RequestStatus, now: DateTime<Utc>) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(Error::invalid_state(format!(
                "request {} cannot move from {} to {}",
                self.request_id, self.status, next
            )));
        }
        self.status = next;
        self.updated_at = now;
        if next.is_terminal() {
            self.completed_at = Some(now);
        }
        Ok(())
    }

    /// Record created resources and move to `IN_PROGRESS`
    pub fn start(&mut self, handles: Vec<ResourceHandle>, now: DateTime<Utc>) -> Result<()> {
        self.transition(RequestStatus::InProgress, now)?;
        self.resource_handles = handles;
        Ok(())
    }

    /// Move to `FAILED` with the given error
    pub fn fail<S: Into<String>>(&mut self, error: S, now: DateTime<Utc>) -> Result<()> {
        self.transition(RequestStatus::Failed, now)?;
        self.last_error = Some(error.into());
        Ok(())
    }

    /// Move to `COMPLETED`
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition(RequestStatus::Completed, now)
    }

    /// Move to `TIMEOUT`
    pub fn time_out(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition(RequestStatus::Timeout, now)?;
        self.last_error = Some(format!(
            "request exceeded its timeout after {}s",
            (now - self.created_at).num_seconds()
        ));
        Ok(())
    }

    /// Move to `CANCELLED`
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition(RequestStatus::Cancelled, now)
    }

    /// Record a machine id; returns `false` if it was already known
    pub fn record_machine<S: AsRef<str>>(&mut self, machine_id: S) -> bool {
        let machine_id = machine_id.as_ref();
        if self.machine_ids.iter().any(|m| m == machine_id) {
            return false;
        }
        self.machine_ids.push(machine_id.to_string());
        true
    }

    /// Record a failed poll; returns the consecutive failure count
    pub fn record_poll_failure<S: Into<String>>(&mut self, error: S, now: DateTime<Utc>) -> u32 {
        self.failed_polls += 1;
        self.last_error = Some(error.into());
        self.updated_at = now;
        self.failed_polls
    }

    /// Clear the consecutive poll failure counter
    ///
    /// Returns `true` if anything changed.
    pub fn reset_poll_failures(&mut self) -> bool {
        if self.failed_polls == 0 {
            return false;
        }
        self.failed_polls = 0;
        true
    }

    /// Whether the request has been active longer than `timeout`
    pub fn is_timed_out(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        match chrono::Duration::from_std(timeout) {
            Ok(timeout) => now - self.created_at > timeout,
            Err(_) => false,
        }
    }

    /// Ids of all resource handles
    pub fn handle_ids(&self) -> Vec<String> {
        self.resource_handles.iter().map(|h| h.id.clone()).collect()
    }
}
