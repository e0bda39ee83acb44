//! Broker composition tests
//!
//! Builds the broker from configuration exactly as the daemon does, with
//! simulated providers resolved through the adapter registry.

use chrono::{TimeZone, Utc};
use orb_domain::entities::Template;
use orb_domain::error::{Error, SelectionError};
use orb_domain::value_objects::{
    MachineStatus, ProviderApi, RequestFilter, RequestStatus, SelectionPolicy,
};
use orb_infrastructure::config::{AppConfig, CapabilitiesConfig, ProviderConfig};
use orb_infrastructure::{AppContext, init_app, init_app_with_clock};
use orb_providers::ManualClock;
use std::sync::Arc;
use std::time::Duration;

pub fn broker_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.selection.policy = SelectionPolicy::Priority;
    config.selection.seed = Some(11);
    config.providers = vec![
        ProviderConfig::new("aws-east", "aws").with_priority(1),
        ProviderConfig::new("aws-west", "aws")
            .with_priority(2)
            .with_extra("fulfillment", "manual"),
        ProviderConfig::new("aws-spot", "aws")
            .with_priority(3)
            .with_capabilities(CapabilitiesConfig::default().with_apis([ProviderApi::SpotFleet])),
    ];
    config.templates = vec![
        Template::new("tpl-run").with_instance_count(2),
        Template::new("tpl-fleet").with_provider_api(ProviderApi::EC2Fleet),
        Template::new("tpl-west")
            .with_provider_name("aws-west")
            .with_provider_api(ProviderApi::EC2Fleet),
    ];
    config
}

pub async fn broker() -> AppContext {
    init_app(broker_config()).await.expect("broker")
}

#[tokio::test]
async fn test_default_configuration_builds_a_working_broker() {
    let context = init_app(AppConfig::default()).await.expect("broker");
    let orchestrator = context.orchestrator();

    let id = orchestrator
        .create_request_from_template(&Template::new("adhoc"), 1)
        .await
        .expect("create");

    assert_eq!(
        orchestrator.reconcile(&id).await.expect("reconcile"),
        RequestStatus::Completed
    );
    let view = orchestrator.get_request_status(&id).await.expect("status");
    assert_eq!(view.provider_name.as_deref(), Some("local"));
}

#[tokio::test]
async fn test_seeded_template_runs_to_completion() {
    let context = broker().await;
    let orchestrator = context.orchestrator();

    let id = orchestrator
        .create_request("tpl-run", 2)
        .await
        .expect("create");
    let view = orchestrator.get_request_status(&id).await.expect("status");
    assert_eq!(view.status, RequestStatus::InProgress);
    assert_eq!(view.provider_name.as_deref(), Some("aws-east"));

    assert_eq!(
        orchestrator.reconcile(&id).await.expect("reconcile"),
        RequestStatus::Completed
    );
    let view = orchestrator.get_request_status(&id).await.expect("status");
    assert_eq!(view.running_count, 2);
    assert!(view.machines.iter().all(|m| m.status == MachineStatus::Running));
    assert!(view.machines.iter().all(|m| m.private_ip.is_some()));
}

#[tokio::test]
async fn test_api_hint_restricts_selection() {
    let context = broker().await;
    let orchestrator = context.orchestrator();

    let spot = Template::new("spot").with_provider_api(ProviderApi::SpotFleet);
    let id = orchestrator
        .create_request_from_template(&spot, 1)
        .await
        .expect("create");
    let view = orchestrator.get_request_status(&id).await.expect("status");

    // Every instance serves SpotFleet; priority picks the lowest value
    assert_eq!(view.provider_name.as_deref(), Some("aws-east"));

    let asg = Template::new("asg")
        .with_provider_type("aws")
        .with_provider_api(ProviderApi::ASG)
        .with_provider_name("aws-spot");
    let err = orchestrator
        .create_request_from_template(&asg, 1)
        .await
        .expect_err("aws-spot only serves SpotFleet");
    assert!(matches!(err, Error::Validation { .. }));
}

#[tokio::test]
async fn test_cancel_terminates_pending_capacity() {
    let context = broker().await;
    let orchestrator = context.orchestrator();

    let id = orchestrator
        .create_request("tpl-west", 3)
        .await
        .expect("create");
    assert_eq!(
        orchestrator.reconcile(&id).await.expect("reconcile"),
        RequestStatus::InProgress
    );

    orchestrator.cancel_request(&id).await.expect("cancel");

    let view = orchestrator.get_request_status(&id).await.expect("status");
    assert_eq!(view.status, RequestStatus::Cancelled);
    let cancelled = orchestrator
        .list_requests(&RequestFilter::all().with_statuses([RequestStatus::Cancelled]))
        .await
        .expect("list");
    assert_eq!(cancelled.len(), 1);
}

#[tokio::test]
async fn test_request_times_out_on_the_injected_clock() {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
    ));
    let mut config = broker_config();
    config.reconciliation.request_timeout_secs = 600;
    let context = init_app_with_clock(config, clock.clone())
        .await
        .expect("broker");
    let orchestrator = context.orchestrator();

    let id = orchestrator
        .create_request("tpl-west", 2)
        .await
        .expect("create");
    clock.advance(Duration::from_secs(601));

    assert_eq!(
        orchestrator.reconcile(&id).await.expect("reconcile"),
        RequestStatus::Timeout
    );
}

#[tokio::test]
async fn test_reload_keeps_bound_requests_reachable() {
    let context = broker().await;
    let orchestrator = context.orchestrator();
    let id = orchestrator
        .create_request("tpl-west", 2)
        .await
        .expect("create");

    context
        .reload_providers(&[ProviderConfig::new("aws-east", "aws")])
        .expect("reload");

    assert_eq!(context.registry().names(), vec!["aws-east"]);
    assert_eq!(
        orchestrator.reconcile(&id).await.expect("reconcile"),
        RequestStatus::InProgress
    );
    orchestrator.cancel_request(&id).await.expect("cancel");

    let err = orchestrator
        .create_request("tpl-west", 1)
        .await
        .expect_err("aws-west is gone");
    assert!(matches!(
        err,
        Error::Selection(SelectionError::ProviderNotFound { .. })
    ));
}

#[tokio::test]
async fn test_unknown_adapter_fails_startup() {
    let mut config = broker_config();
    config.providers.push(ProviderConfig::new("azure", "azure").with_adapter("arm"));

    let err = init_app(config).await.expect_err("unknown adapter");

    assert!(err.to_string().contains("arm"));
}
