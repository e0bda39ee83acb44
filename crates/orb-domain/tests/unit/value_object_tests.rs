//! Unit tests for value objects

use orb_domain::entities::{ProviderCapabilities, Request, Template};
use orb_domain::value_objects::{
    FleetType, PricingModel, ProviderApi, ProviderSelectionResult, RequestFilter, RequestStatus,
    SelectionPolicy, ValidationLevel,
};

#[test]
fn test_provider_api_parsing() {
    assert_eq!("EC2Fleet".parse::<ProviderApi>().unwrap(), ProviderApi::EC2Fleet);
    assert_eq!("asg".parse::<ProviderApi>().unwrap(), ProviderApi::ASG);
    assert_eq!("run_instances".parse::<ProviderApi>().unwrap(), ProviderApi::RunInstances);
    assert!("Lambda".parse::<ProviderApi>().is_err());
}

#[test]
fn test_provider_api_serde_names() {
    let json = serde_json::to_string(&ProviderApi::SpotFleet).unwrap();
    assert_eq!(json, "\"SpotFleet\"");
}

#[test]
fn test_fleet_type_compatibility() {
    assert!(ProviderApi::EC2Fleet.accepts_fleet_type(FleetType::Instant));
    assert!(!ProviderApi::SpotFleet.accepts_fleet_type(FleetType::Instant));
    assert!(ProviderApi::SpotFleet.accepts_fleet_type(FleetType::Maintain));
    assert!(!ProviderApi::ASG.uses_fleet_type());
}

#[test]
fn test_pricing_model_parsing() {
    assert_eq!("on-demand".parse::<PricingModel>().unwrap(), PricingModel::OnDemand);
    assert_eq!("spot".parse::<PricingModel>().unwrap(), PricingModel::Spot);
}

#[test]
fn test_selection_policy_parsing() {
    assert_eq!(
        "weighted-round-robin".parse::<SelectionPolicy>().unwrap(),
        SelectionPolicy::WeightedRoundRobin
    );
    assert_eq!(SelectionPolicy::default(), SelectionPolicy::Default);
}

#[test]
fn test_validation_level_accepts_upper_case() {
    let level: ValidationLevel = serde_json::from_str("\"STRICT\"").unwrap();
    assert_eq!(level, ValidationLevel::Strict);
    let level: ValidationLevel = serde_json::from_str("\"basic\"").unwrap();
    assert_eq!(level, ValidationLevel::Basic);
}

#[test]
fn test_capabilities_builders() {
    let caps = ProviderCapabilities::for_apis([ProviderApi::EC2Fleet])
        .with_max_instances(10)
        .with_pricing_models([PricingModel::OnDemand]);
    assert!(caps.supports_api(ProviderApi::EC2Fleet));
    assert!(!caps.supports_api(ProviderApi::ASG));
    assert!(!caps.supports_pricing_model(PricingModel::Spot));
    assert_eq!(caps.max_instances_per_request, 10);
}

#[test]
fn test_selection_result_candidates_order() {
    let result = ProviderSelectionResult {
        provider_name: "a".to_string(),
        provider_type: "aws".to_string(),
        policy: SelectionPolicy::Priority,
        reason: "lowest priority".to_string(),
        confidence: 0.9,
        alternatives: vec!["b".to_string(), "c".to_string()],
    };
    let order: Vec<&str> = result.candidates().collect();
    assert_eq!(order, vec!["a", "b", "c"]);
}

#[test]
fn test_request_filter_matches() {
    let mut request = Request::new(&Template::new("tpl-1"), 1);
    request.bind_provider("aws-east", "aws", None).unwrap();

    assert!(RequestFilter::all().matches(&request));
    assert!(RequestFilter::active().matches(&request));
    assert!(RequestFilter::all().with_template("tpl-1").matches(&request));
    assert!(!RequestFilter::all().with_template("tpl-2").matches(&request));
    assert!(RequestFilter::all().with_provider("aws-east").matches(&request));
    assert!(
        !RequestFilter::all()
            .with_statuses([RequestStatus::Completed])
            .matches(&request)
    );
}
