//! Tests for the versioned in-memory repositories

use chrono::{Duration, TimeZone, Utc};
use orb_domain::entities::{Machine, Request, Template};
use orb_domain::error::Error;
use orb_domain::repositories::{MachineRepository, RequestRepository, TemplateRepository};
use orb_domain::value_objects::{
    InstanceDescriptor, InstanceState, RequestFilter, RequestStatus,
};
use orb_providers::storage::{
    InMemoryMachineRepository, InMemoryRequestRepository, InMemoryTemplateRepository,
};

fn request_at(template: &str, minutes: i64) -> Request {
    let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    Request::new_at(&Template::new(template), 1, base + Duration::minutes(minutes))
}

#[tokio::test]
async fn test_save_assigns_first_version_and_rejects_duplicates() {
    let repo = InMemoryRequestRepository::new();
    let request = request_at("t", 0);

    let stored = repo.save(&request).await.expect("save");
    assert_eq!(stored.version, 1);

    let err = repo.save(&request).await.expect_err("duplicate");
    assert!(err.is_version_conflict());
}

#[tokio::test]
async fn test_stale_update_is_rejected() {
    let repo = InMemoryRequestRepository::new();
    let stored = repo.save(&request_at("t", 0)).await.expect("save");

    let mut first = stored.clone();
    first.transition(RequestStatus::InProgress, Utc::now()).expect("transition");
    let updated = repo.update(&first).await.expect("update");
    assert_eq!(updated.version, 2);

    let mut stale = stored;
    stale.transition(RequestStatus::Cancelled, Utc::now()).expect("transition");
    let err = repo.update(&stale).await.expect_err("stale");
    assert!(matches!(
        err,
        Error::VersionConflict {
            expected: 1,
            actual: 2,
            ..
        }
    ));

    let current = repo
        .get(&updated.request_id)
        .await
        .expect("get")
        .expect("exists");
    assert_eq!(current.status, RequestStatus::InProgress);
}

#[tokio::test]
async fn test_update_of_unknown_request_is_not_found() {
    let repo = InMemoryRequestRepository::new();
    let err = repo.update(&request_at("t", 0)).await.expect_err("missing");
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn test_query_orders_oldest_first_and_applies_filter() {
    let repo = InMemoryRequestRepository::new();
    let newest = repo.save(&request_at("web", 20)).await.expect("save");
    let oldest = repo.save(&request_at("web", 0)).await.expect("save");
    let other = repo.save(&request_at("batch", 10)).await.expect("save");

    let all = repo.query(&RequestFilter::all()).await.expect("query");
    let ids: Vec<_> = all.iter().map(|r| r.request_id.clone()).collect();
    assert_eq!(ids, vec![oldest.request_id.clone(), other.request_id, newest.request_id]);

    let web = repo
        .query(&RequestFilter::all().with_template("web").with_limit(1))
        .await
        .expect("query");
    assert_eq!(web.len(), 1);
    assert_eq!(web[0].request_id, oldest.request_id);

    let done = repo
        .query(&RequestFilter::all().with_statuses([RequestStatus::Completed]))
        .await
        .expect("query");
    assert!(done.is_empty());
}

#[tokio::test]
async fn test_machines_are_listed_per_request() {
    let repo = InMemoryMachineRepository::new();
    let a = request_at("t", 0);
    let b = request_at("t", 1);
    let now = Utc::now();

    for (request, id) in [(&a, "i-1"), (&a, "i-2"), (&b, "i-3")] {
        let descriptor = InstanceDescriptor::new(id, InstanceState::Running);
        let machine = Machine::from_descriptor(&request.request_id, "fleet-1", "p", &descriptor, now);
        repo.save(&machine).await.expect("save");
    }

    let of_a = repo.list_by_request(&a.request_id).await.expect("list");
    let ids: Vec<&str> = of_a.iter().map(|m| m.machine_id.as_str()).collect();
    assert_eq!(ids, vec!["i-1", "i-2"]);

    let mut machine = repo.get("i-3").await.expect("get").expect("exists");
    machine.apply_descriptor(&InstanceDescriptor::new("i-3", InstanceState::Terminated), now);
    let updated = repo.update(&machine).await.expect("update");
    assert_eq!(updated.version, 2);
}

#[tokio::test]
async fn test_templates_are_listed_by_id() {
    let repo = InMemoryTemplateRepository::new();
    repo.save(&Template::new("web")).await.expect("save");
    repo.save(&Template::new("batch")).await.expect("save");

    let ids: Vec<String> = repo
        .list()
        .await
        .expect("list")
        .into_iter()
        .map(|t| t.template_id)
        .collect();
    assert_eq!(ids, vec!["batch", "web"]);
}
