//! Unit tests for domain error types

use orb_domain::error::ValidationIssue;
use orb_domain::{Error, ProviderErrorKind, SelectionError, ValidationErrorKind};

#[test]
fn test_not_found_error() {
    let error = Error::not_found("request req-1");
    match error {
        Error::NotFound { resource } => assert_eq!(resource, "request req-1"),
        _ => panic!("Expected NotFound error"),
    }
}

#[test]
fn test_transient_error_classification() {
    let error = Error::transient("aws-east", "throttled");
    assert!(error.is_transient());
    assert!(!error.is_permanent());
    assert!(error.allows_fallback());
    assert_eq!(error.provider_kind(), Some(ProviderErrorKind::Transient));
}

#[test]
fn test_permanent_error_classification() {
    let error = Error::permanent("aws-east", "invalid image id");
    assert!(error.is_permanent());
    assert!(!error.is_transient());
    assert!(!error.allows_fallback());
}

#[test]
fn test_circuit_open_allows_fallback() {
    let error = Error::circuit_open("aws-east");
    assert!(error.is_circuit_open());
    assert!(error.allows_fallback());
    assert!(error.to_string().contains("aws-east"));
}

#[test]
fn test_resource_not_found_is_permanent() {
    let error = Error::resource_not_found("fleet-abc");
    assert!(error.is_permanent());
    assert!(error.to_string().contains("fleet-abc"));
}

#[test]
fn test_cancelled_is_neither_retried_nor_failed_over() {
    let error = Error::cancelled("describe_instances");
    assert!(error.is_cancelled());
    assert!(!error.is_transient());
    assert!(!error.is_permanent());
    assert!(!error.allows_fallback());
    assert!(error.to_string().contains("describe_instances"));
}

#[test]
fn test_partial_discovery_failure_is_transient() {
    let error = Error::PartialDiscoveryFailure {
        failed: 1,
        total: 2,
        message: "timeout".to_string(),
    };
    assert!(error.is_transient());
}

#[test]
fn test_providers_exhausted_inherits_last_classification() {
    let error = Error::ProvidersExhausted {
        attempted: vec!["a".to_string(), "b".to_string()],
        last: Box::new(Error::transient("b", "503")),
    };
    assert!(error.is_transient());
    let display = error.to_string();
    assert!(display.contains("a, b"));
    assert!(display.contains("503"));
}

#[test]
fn test_selection_error_is_permanent() {
    let error: Error = SelectionError::ProviderDisabled {
        name: "aws-west".to_string(),
    }
    .into();
    assert!(error.is_permanent());
    assert!(error.to_string().contains("aws-west"));
}

#[test]
fn test_validation_error_lists_issues() {
    let error = Error::Validation {
        provider: "aws-east".to_string(),
        issues: vec![
            ValidationIssue::new(ValidationErrorKind::ApiNotSupported, "ASG not supported"),
            ValidationIssue::new(ValidationErrorKind::InstanceLimitExceeded, "10 > 5"),
        ],
    };
    let display = error.to_string();
    assert!(display.contains("api_not_supported: ASG not supported"));
    assert!(display.contains("instance_limit_exceeded: 10 > 5"));
}

#[test]
fn test_version_conflict() {
    let error = Error::version_conflict("request", "req-1", 2, 3);
    assert!(error.is_version_conflict());
    assert!(error.provider_kind().is_none());
}

#[test]
fn test_error_from_string() {
    let error: Error = "boom".into();
    match error {
        Error::Internal { message } => assert_eq!(message, "boom"),
        _ => panic!("Expected Internal error"),
    }
}
