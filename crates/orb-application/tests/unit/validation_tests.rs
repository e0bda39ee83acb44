//! Tests for capability validation levels

use orb_application::domain_services::CapabilityValidator;
use orb_application::domain_services::validation::validate_at;
use orb_domain::entities::{ProviderCapabilities, ProviderInstance, Template};
use orb_domain::error::{Error, ValidationErrorKind};
use orb_domain::value_objects::{FleetType, PricingModel, ProviderApi, ValidationLevel};

const LEVELS: [ValidationLevel; 3] = [
    ValidationLevel::Strict,
    ValidationLevel::Lenient,
    ValidationLevel::Basic,
];

fn ondemand_provider() -> ProviderInstance {
    ProviderInstance::new("aws-east", "aws").with_capabilities(
        ProviderCapabilities::all()
            .with_pricing_models([PricingModel::OnDemand])
            .with_max_instances(10),
    )
}

fn kinds(issues: &[orb_domain::error::ValidationIssue]) -> Vec<ValidationErrorKind> {
    issues.iter().map(|i| i.kind).collect()
}

#[test]
fn test_pricing_mismatch_is_warning_or_error_by_level() {
    let provider = ondemand_provider();
    let template = Template::new("t").with_pricing_model(PricingModel::Spot);

    let lenient = validate_at(ValidationLevel::Lenient, &template, 1, &provider);
    assert!(lenient.valid);
    assert_eq!(kinds(&lenient.warnings), vec![ValidationErrorKind::PricingModelMismatch]);

    let strict = validate_at(ValidationLevel::Strict, &template, 1, &provider);
    assert!(!strict.valid);
    assert_eq!(kinds(&strict.errors), vec![ValidationErrorKind::PricingModelMismatch]);
    assert!(strict.warnings.is_empty());

    let basic = validate_at(ValidationLevel::Basic, &template, 1, &provider);
    assert!(basic.valid);
    assert!(basic.warnings.is_empty());
}

#[test]
fn test_strict_accepts_nothing_lenient_rejects() {
    let provider = ondemand_provider();
    let templates = [
        Template::new("a"),
        Template::new("b").with_pricing_model(PricingModel::Spot),
        Template::new("c").with_provider_api(ProviderApi::SpotFleet).with_fleet_type(FleetType::Instant),
        Template::new("d").with_instance_count(50),
    ];
    for template in &templates {
        for count in [1, 10, 11] {
            let strict = validate_at(ValidationLevel::Strict, template, count, &provider);
            let lenient = validate_at(ValidationLevel::Lenient, template, count, &provider);
            let basic = validate_at(ValidationLevel::Basic, template, count, &provider);
            if strict.valid {
                assert!(lenient.valid, "template {} count {}", template.template_id, count);
            }
            if lenient.valid {
                assert!(basic.valid, "template {} count {}", template.template_id, count);
            }
        }
    }
}

#[test]
fn test_unsupported_api_fails_at_every_level() {
    let provider = ProviderInstance::new("p", "aws")
        .with_capabilities(ProviderCapabilities::for_apis([ProviderApi::RunInstances]));
    let template = Template::new("t").with_provider_api(ProviderApi::EC2Fleet);
    for level in LEVELS {
        let report = validate_at(level, &template, 1, &provider);
        assert!(!report.valid, "{:?}", level);
        assert_eq!(kinds(&report.errors), vec![ValidationErrorKind::ApiNotSupported]);
    }
}

#[test]
fn test_instance_limit_is_an_error_above_basic() {
    let provider = ondemand_provider();
    let template = Template::new("t");

    let report = validate_at(ValidationLevel::Lenient, &template, 11, &provider);
    assert_eq!(kinds(&report.errors), vec![ValidationErrorKind::InstanceLimitExceeded]);
    assert!(validate_at(ValidationLevel::Lenient, &template, 10, &provider).valid);
    assert!(validate_at(ValidationLevel::Basic, &template, 11, &provider).valid);
}

#[test]
fn test_spot_fleet_rejects_instant_sub_type() {
    let provider = ProviderInstance::new("p", "aws");
    let template = Template::new("t")
        .with_provider_api(ProviderApi::SpotFleet)
        .with_fleet_type(FleetType::Instant);

    let report = validate_at(ValidationLevel::Lenient, &template, 1, &provider);
    assert!(report.valid);
    assert_eq!(kinds(&report.warnings), vec![ValidationErrorKind::FleetTypeIncompatible]);

    let instant_fleet = Template::new("t")
        .with_provider_api(ProviderApi::EC2Fleet)
        .with_fleet_type(FleetType::Instant);
    let report = validate_at(ValidationLevel::Strict, &instant_fleet, 1, &provider);
    assert!(report.valid);
    assert!(report.supported_features.contains(&"fleet_type:instant".to_string()));
}

#[test]
fn test_invalid_report_converts_to_validation_error() {
    let provider = ondemand_provider();
    let validator = CapabilityValidator::new(ValidationLevel::Strict);
    let report = validator.validate(&Template::new("t"), 100, &provider);
    assert_eq!(report.level, ValidationLevel::Strict);

    let err = report.into_result().expect_err("invalid");
    match err {
        Error::Validation { provider, issues } => {
            assert_eq!(provider, "aws-east");
            assert_eq!(issues.len(), 1);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
