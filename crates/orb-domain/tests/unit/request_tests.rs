//! Unit tests for the request state machine

use chrono::{TimeZone, Utc};
use orb_domain::entities::{Request, Template};
use orb_domain::value_objects::{ProviderApi, RequestStatus, ResourceHandle};
use std::time::Duration;

fn template() -> Template {
    Template::new("tpl-1").with_provider_api(ProviderApi::EC2Fleet)
}

fn t(secs: i64) -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

#[test]
fn test_new_request_is_pending() {
    let request = Request::new_at(&template(), 5, t(0));
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.provider_api, ProviderApi::EC2Fleet);
    assert_eq!(request.requested_count, 5);
    assert!(request.request_id.as_str().starts_with("req-"));
    assert!(request.completed_at.is_none());
}

#[test]
fn test_bind_provider_only_once() {
    let mut request = Request::new_at(&template(), 1, t(0));
    request
        .bind_provider("aws-east", "aws", Some("explicit".to_string()))
        .unwrap();
    let second = request.bind_provider("aws-west", "aws", None);
    assert!(second.is_err());
    assert_eq!(request.provider_name.as_deref(), Some("aws-east"));
}

#[test]
fn test_start_then_complete_sets_completed_at() {
    let mut request = Request::new_at(&template(), 1, t(0));
    request
        .start(vec![ResourceHandle::new("fleet-abc", ProviderApi::EC2Fleet)], t(1))
        .unwrap();
    assert_eq!(request.status, RequestStatus::InProgress);
    assert_eq!(request.handle_ids(), vec!["fleet-abc".to_string()]);

    request.complete(t(5)).unwrap();
    assert_eq!(request.status, RequestStatus::Completed);
    assert_eq!(request.completed_at, Some(t(5)));
}

#[test]
fn test_pending_cannot_complete() {
    let mut request = Request::new_at(&template(), 1, t(0));
    assert!(request.complete(t(1)).is_err());
    assert_eq!(request.status, RequestStatus::Pending);
}

#[test]
fn test_pending_request_can_time_out() {
    let mut request = Request::new_at(&template(), 1, t(0));
    request.time_out(t(120)).unwrap();
    assert_eq!(request.status, RequestStatus::Timeout);
    assert!(request.last_error.as_deref().unwrap().contains("120s"));
}

#[test]
fn test_terminal_states_have_no_exits() {
    let terminal = [
        RequestStatus::Completed,
        RequestStatus::Failed,
        RequestStatus::Timeout,
        RequestStatus::Cancelled,
    ];
    let all = [
        RequestStatus::Pending,
        RequestStatus::InProgress,
        RequestStatus::Completed,
        RequestStatus::Failed,
        RequestStatus::Timeout,
        RequestStatus::Cancelled,
    ];
    for from in terminal {
        assert!(from.is_terminal());
        for to in all {
            assert!(!from.can_transition_to(to), "{} -> {} allowed", from, to);
        }
    }
}

#[test]
fn test_failed_request_rejects_cancel() {
    let mut request = Request::new_at(&template(), 1, t(0));
    request.fail("permanent error", t(1)).unwrap();
    assert!(request.cancel(t(2)).is_err());
    assert_eq!(request.status, RequestStatus::Failed);
    assert_eq!(request.last_error.as_deref(), Some("permanent error"));
}

#[test]
fn test_record_machine_deduplicates() {
    let mut request = Request::new_at(&template(), 2, t(0));
    assert!(request.record_machine("i-1"));
    assert!(!request.record_machine("i-1"));
    assert!(request.record_machine("i-2"));
    assert_eq!(request.machine_ids, vec!["i-1", "i-2"]);
}

#[test]
fn test_poll_failures_count_and_reset() {
    let mut request = Request::new_at(&template(), 1, t(0));
    assert_eq!(request.record_poll_failure("throttled", t(1)), 1);
    assert_eq!(request.record_poll_failure("throttled", t(2)), 2);
    assert!(request.reset_poll_failures());
    assert!(!request.reset_poll_failures());
    assert_eq!(request.failed_polls, 0);
}

#[test]
fn test_timeout_detection() {
    let request = Request::new_at(&template(), 1, t(0));
    assert!(!request.is_timed_out(t(60), Duration::from_secs(60)));
    assert!(request.is_timed_out(t(61), Duration::from_secs(60)));
}

#[test]
fn test_request_serialization_uses_screaming_status() {
    let request = Request::new_at(&template(), 1, t(0));
    let json = serde_json::to_string(&request).expect("serialization should succeed");
    assert!(json.contains("\"PENDING\""));
    let back: Request = serde_json::from_str(&json).expect("deserialization should succeed");
    assert_eq!(back, request);
}
