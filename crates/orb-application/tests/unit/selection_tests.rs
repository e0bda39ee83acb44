//! Tests for provider selection policies

use std::sync::Arc;

use orb_application::domain_services::{ProviderSelector, RandomSource, SeededRandom};
use orb_domain::entities::{ProviderCapabilities, ProviderInstance, Template};
use orb_domain::error::SelectionError;
use orb_domain::value_objects::{
    PricingModel, ProviderApi, ProviderHealthStatus, SelectionPolicy,
};

fn selector(policy: SelectionPolicy) -> ProviderSelector {
    ProviderSelector::new(policy, None, Arc::new(SeededRandom::new(42)))
}

/// Always draws the same value
struct FixedDraw(u64);

impl RandomSource for FixedDraw {
    fn next_in_range(&self, low: u64, high: u64) -> u64 {
        self.0.clamp(low, high)
    }
}

fn aws(name: &str) -> ProviderInstance {
    ProviderInstance::new(name, "aws")
}

#[test]
fn test_weighted_draws_follow_weights() {
    let providers = vec![aws("a").with_weight(10), aws("b").with_weight(5)];
    let selector = selector(SelectionPolicy::WeightedRoundRobin);
    let template = Template::new("t");

    let mut picked_a = 0;
    for _ in 0..10_000 {
        let result = selector.select(&template, 1, &providers).expect("select");
        if result.provider_name == "a" {
            picked_a += 1;
        }
    }
    assert!(
        (6367..=6967).contains(&picked_a),
        "expected about 2/3 picks of 'a', got {}",
        picked_a
    );
}

#[test]
fn test_weighted_draw_walks_cumulative_weights() {
    let providers = vec![aws("a").with_weight(10), aws("b").with_weight(5)];
    let template = Template::new("t");

    let low = ProviderSelector::new(SelectionPolicy::WeightedRoundRobin, None, Arc::new(FixedDraw(10)));
    let result = low.select(&template, 1, &providers).expect("select");
    assert_eq!(result.provider_name, "a");
    assert!((result.confidence - 10.0 / 15.0).abs() < 1e-9);
    assert_eq!(result.alternatives, vec!["b".to_string()]);

    let high = ProviderSelector::new(SelectionPolicy::WeightedRoundRobin, None, Arc::new(FixedDraw(11)));
    let result = high.select(&template, 1, &providers).expect("select");
    assert_eq!(result.provider_name, "b");
    assert_eq!(result.alternatives, vec!["a".to_string()]);
}

#[test]
fn test_zero_weight_instances_trail_the_alternatives() {
    let providers = vec![
        aws("idle-b").with_weight(0),
        aws("a").with_weight(10),
        aws("idle-a").with_weight(0),
        aws("b").with_weight(5),
        aws("c").with_weight(20),
    ];
    let template = Template::new("t");

    let selector = ProviderSelector::new(SelectionPolicy::WeightedRoundRobin, None, Arc::new(FixedDraw(1)));
    for _ in 0..5 {
        let result = selector.select(&template, 1, &providers).expect("select");
        assert_eq!(result.provider_name, "a");
        assert_eq!(
            result.alternatives,
            vec!["c".to_string(), "b".to_string(), "idle-a".to_string(), "idle-b".to_string()]
        );
    }

    let disabled = vec![aws("a").with_weight(10), aws("off").with_weight(0).with_enabled(false)];
    let result = selector.select(&template, 1, &disabled).expect("select");
    assert!(result.alternatives.is_empty());
}

#[test]
fn test_weighted_skips_zero_weight_instances() {
    let providers = vec![aws("a").with_weight(0), aws("b").with_weight(0)];
    let err = selector(SelectionPolicy::WeightedRoundRobin)
        .select(&Template::new("t"), 1, &providers)
        .expect_err("no weight");
    assert!(matches!(err, SelectionError::NoEnabledProviders { .. }));
}

#[test]
fn test_explicit_name_wins_with_full_confidence() {
    let providers = vec![aws("a").with_priority(1), aws("b").with_priority(2)];
    let template = Template::new("t").with_provider_name("b");

    let result = selector(SelectionPolicy::Priority)
        .select(&template, 1, &providers)
        .expect("select");
    assert_eq!(result.provider_name, "b");
    assert_eq!(result.policy, SelectionPolicy::Explicit);
    assert!((result.confidence - 1.0).abs() < f64::EPSILON);
    assert!(result.alternatives.is_empty());
}

#[test]
fn test_explicit_name_unknown_or_disabled() {
    let providers = vec![aws("a"), aws("b").with_enabled(false)];
    let selector = selector(SelectionPolicy::Priority);

    let missing = selector
        .select(&Template::new("t").with_provider_name("zzz"), 1, &providers)
        .expect_err("missing");
    assert_eq!(missing, SelectionError::ProviderNotFound { name: "zzz".into() });

    let disabled = selector
        .select(&Template::new("t").with_provider_name("b"), 1, &providers)
        .expect_err("disabled");
    assert_eq!(disabled, SelectionError::ProviderDisabled { name: "b".into() });
}

#[test]
fn test_explicit_policy_requires_a_name() {
    let err = selector(SelectionPolicy::Explicit)
        .select(&Template::new("t"), 1, &[aws("a")])
        .expect_err("no name");
    assert!(matches!(err, SelectionError::NoCompatibleProvider { .. }));
}

#[test]
fn test_type_filter_without_enabled_match() {
    let providers = vec![aws("a").with_enabled(false), ProviderInstance::new("g", "gcp")];
    let err = selector(SelectionPolicy::Priority)
        .select(&Template::new("t").with_provider_type("aws"), 1, &providers)
        .expect_err("none enabled");
    assert_eq!(err, SelectionError::NoEnabledProviders { scope: "type=aws".into() });
}

#[test]
fn test_api_filter_without_support() {
    let providers = vec![
        aws("a").with_capabilities(ProviderCapabilities::for_apis([ProviderApi::RunInstances])),
    ];
    let template = Template::new("t").with_provider_api(ProviderApi::SpotFleet);
    let err = selector(SelectionPolicy::Priority)
        .select(&template, 1, &providers)
        .expect_err("unsupported");
    assert!(matches!(err, SelectionError::NoCompatibleProvider { .. }));
}

#[test]
fn test_api_filter_narrows_candidates() {
    let providers = vec![
        aws("a")
            .with_priority(1)
            .with_capabilities(ProviderCapabilities::for_apis([ProviderApi::RunInstances])),
        aws("b").with_priority(5),
    ];
    let template = Template::new("t").with_provider_api(ProviderApi::ASG);
    let result = selector(SelectionPolicy::Priority)
        .select(&template, 1, &providers)
        .expect("select");
    assert_eq!(result.provider_name, "b");
    assert!((result.confidence - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_priority_lowest_value_wins() {
    let providers = vec![aws("a").with_priority(20), aws("b").with_priority(10), aws("c").with_priority(30)];
    let result = selector(SelectionPolicy::Priority)
        .select(&Template::new("t"), 1, &providers)
        .expect("select");
    assert_eq!(result.provider_name, "b");
    assert!((result.confidence - 0.9).abs() < 1e-9);
    assert_eq!(result.alternatives, vec!["a".to_string(), "c".to_string()]);
}

#[test]
fn test_priority_tie_breaks_by_name_with_lower_confidence() {
    let providers = vec![aws("zeta").with_priority(1), aws("alpha").with_priority(1)];
    let result = selector(SelectionPolicy::Priority)
        .select(&Template::new("t"), 1, &providers)
        .expect("select");
    assert_eq!(result.provider_name, "alpha");
    assert!((result.confidence - 0.7).abs() < 1e-9);
}

#[test]
fn test_capability_based_prefers_best_match() {
    let providers = vec![
        aws("ondemand-only").with_capabilities(
            ProviderCapabilities::all().with_pricing_models([PricingModel::OnDemand]),
        ),
        aws("spot-ready").with_priority(500),
    ];
    let template = Template::new("t").with_pricing_model(PricingModel::Spot);
    let result = selector(SelectionPolicy::CapabilityBased)
        .select(&template, 1, &providers)
        .expect("select");
    assert_eq!(result.provider_name, "spot-ready");
    assert_eq!(result.alternatives, vec!["ondemand-only".to_string()]);
}

#[test]
fn test_capability_based_ties_prefer_healthy() {
    let providers = vec![
        aws("a").with_health(ProviderHealthStatus::Degraded),
        aws("b"),
    ];
    let result = selector(SelectionPolicy::CapabilityBased)
        .select(&Template::new("t"), 1, &providers)
        .expect("select");
    assert_eq!(result.provider_name, "b");
}

#[test]
fn test_default_policy_takes_first_in_configuration_order() {
    let providers = vec![aws("first").with_enabled(false), aws("second"), aws("third")];
    let result = selector(SelectionPolicy::Default)
        .select(&Template::new("t"), 1, &providers)
        .expect("select");
    assert_eq!(result.provider_name, "second");
    assert!((result.confidence - 0.8).abs() < 1e-9);
    assert_eq!(result.candidates().collect::<Vec<_>>(), vec!["second", "third"]);
}

#[test]
fn test_configured_default_provider_is_used_without_hints() {
    let providers = vec![
        aws("a").with_priority(1),
        aws("b").with_priority(9),
        ProviderInstance::new("g", "gcp"),
    ];
    let selector = ProviderSelector::new(
        SelectionPolicy::Priority,
        Some("b".to_string()),
        Arc::new(SeededRandom::new(1)),
    );
    let result = selector
        .select(&Template::new("t"), 1, &providers)
        .expect("select");
    assert_eq!(result.provider_name, "b");
    assert_eq!(result.policy, SelectionPolicy::Default);
    assert_eq!(result.alternatives, vec!["a".to_string()]);
}

#[test]
fn test_no_providers_at_all() {
    let err = selector(SelectionPolicy::Priority)
        .select(&Template::new("t"), 1, &[])
        .expect_err("empty");
    assert_eq!(err, SelectionError::NoEnabledProviders { scope: "all".into() });
}
