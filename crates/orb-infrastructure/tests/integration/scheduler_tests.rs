//! Reconciliation scheduler tests
//!
//! Run on a paused tokio clock; sleeps advance time instantly once every
//! task is idle.

use crate::broker_tests::broker;
use orb_domain::value_objects::{RequestId, RequestStatus};
use orb_infrastructure::ReconciliationScheduler;
use orb_infrastructure::scheduler::SchedulerConfig;
use orb_application::domain_services::SeededRandom;
use std::sync::Arc;
use std::time::Duration;

async fn wait_until_untracked(scheduler: &ReconciliationScheduler, id: &RequestId) {
    for _ in 0..1000 {
        if !scheduler.is_tracked(id) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("request {} still tracked", id);
}

#[tokio::test(start_paused = true)]
async fn test_tracked_request_is_polled_until_terminal() {
    let context = broker().await;
    let orchestrator = context.orchestrator();
    let scheduler = context.scheduler();
    let id = orchestrator
        .create_request("tpl-fleet", 3)
        .await
        .expect("create");

    assert!(scheduler.track(id.clone()));
    assert!(!scheduler.track(id.clone()), "already tracked");
    wait_until_untracked(&scheduler, &id).await;

    let view = orchestrator.get_request_status(&id).await.expect("status");
    assert_eq!(view.status, RequestStatus::Completed);
    assert_eq!(scheduler.tracked_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_scan_picks_up_untracked_active_requests() {
    let context = broker().await;
    let orchestrator = context.orchestrator();
    let scheduler = context.scheduler();
    let first = orchestrator.create_request("tpl-run", 1).await.expect("create");
    let second = orchestrator.create_request("tpl-run", 2).await.expect("create");
    let pending = orchestrator.create_request("tpl-west", 2).await.expect("create");

    assert_eq!(scheduler.scan().await.expect("scan"), 3);
    wait_until_untracked(&scheduler, &first).await;
    wait_until_untracked(&scheduler, &second).await;

    assert!(scheduler.is_tracked(&pending));
    assert_eq!(scheduler.scan().await.expect("scan"), 0);
    scheduler.shutdown();
    wait_until_untracked(&scheduler, &pending).await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_polling_and_scanning() {
    let context = broker().await;
    let orchestrator = context.orchestrator();
    let scheduler = context.scheduler();
    let id = orchestrator
        .create_request("tpl-west", 2)
        .await
        .expect("create");

    let scanning = scheduler.spawn();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(scheduler.is_tracked(&id));

    scheduler.shutdown();
    scanning.await.expect("scan loop exits");
    wait_until_untracked(&scheduler, &id).await;

    assert!(scheduler.is_shut_down());
    assert!(!scheduler.track(id.clone()));
    let view = orchestrator.get_request_status(&id).await.expect("status");
    assert_eq!(view.status, RequestStatus::InProgress);
}

#[tokio::test]
async fn test_poll_delay_stays_within_jitter() {
    let context = broker().await;
    let scheduler = ReconciliationScheduler::new(
        context.orchestrator(),
        SchedulerConfig {
            poll_interval: Duration::from_secs(10),
            poll_jitter: Duration::from_secs(2),
            scan_interval: Duration::from_secs(60),
        },
        Arc::new(SeededRandom::new(5)),
    );

    let delays: Vec<Duration> = (0..500).map(|_| scheduler.next_delay()).collect();

    assert!(delays.iter().all(|d| *d >= Duration::from_secs(8)));
    assert!(delays.iter().all(|d| *d <= Duration::from_secs(12)));
    assert!(delays.iter().any(|d| *d < Duration::from_secs(10)));
    assert!(delays.iter().any(|d| *d > Duration::from_secs(10)));
}
