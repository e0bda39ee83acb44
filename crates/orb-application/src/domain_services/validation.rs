//! Capability Validation
//!
//! Checks a template against one provider instance's advertised
//! capabilities. Checks run in a fixed order:
//!
//! | Check | Finding | Severity |
//! |-------|---------|----------|
//! | API supported | `ApiNotSupported` | error |
//! | count within per-request limit | `InstanceLimitExceeded` | error |
//! | pricing model supported | `PricingModelMismatch` | warning |
//! | fleet sub-type supported | `FleetTypeIncompatible` | warning |
//!
//! `STRICT` promotes warnings to errors, `LENIENT` keeps them non-fatal and
//! `BASIC` runs only the API check. Validation has no side effects.

use orb_domain::entities::{ProviderInstance, Template};
use orb_domain::error::{ValidationErrorKind, ValidationIssue};
use orb_domain::value_objects::{ValidationLevel, ValidationReport};

/// Validates templates against provider capabilities
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityValidator {
    level: ValidationLevel,
}

impl CapabilityValidator {
    /// Create a validator at the given level
    pub fn new(level: ValidationLevel) -> Self {
        Self { level }
    }

    /// Configured level
    pub fn level(&self) -> ValidationLevel {
        self.level
    }

    /// Validate at the configured level
    pub fn validate(
        &self,
        template: &Template,
        count: u32,
        provider: &ProviderInstance,
    ) -> ValidationReport {
        validate_at(self.level, template, count, provider)
    }
}

/// Validate at an explicit level
pub fn validate_at(
    level: ValidationLevel,
    template: &Template,
    count: u32,
    provider: &ProviderInstance,
) -> ValidationReport {
    let caps = &provider.capabilities;
    let api = template.effective_api();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut supported_features = Vec::new();
    let mut checks_evaluated = 1;

    if caps.supports_api(api) {
        supported_features.push(format!("api:{}", api));
    } else {
        errors.push(ValidationIssue::new(
            ValidationErrorKind::ApiNotSupported,
            format!("provider '{}' does not support {}", provider.name, api),
        ));
    }

    if level != ValidationLevel::Basic {
        checks_evaluated += 1;
        if count <= caps.max_instances_per_request {
            supported_features.push(format!("count:{}", count));
        } else {
            errors.push(ValidationIssue::new(
                ValidationErrorKind::InstanceLimitExceeded,
                format!(
                    "requested {} instances, provider '{}' allows {} per request",
                    count, provider.name, caps.max_instances_per_request
                ),
            ));
        }

        if let Some(model) = template.pricing_model {
            checks_evaluated += 1;
            if caps.supports_pricing_model(model) {
                supported_features.push(format!("pricing:{}", model));
            } else {
                warnings.push(ValidationIssue::new(
                    ValidationErrorKind::PricingModelMismatch,
                    format!(
                        "provider '{}' does not support {} pricing",
                        provider.name, model
                    ),
                ));
            }
        }

        if let Some(fleet_type) = template.fleet_type {
            if api.uses_fleet_type() {
                checks_evaluated += 1;
                if caps.supports_fleet_type(fleet_type) && api.accepts_fleet_type(fleet_type) {
                    supported_features.push(format!("fleet_type:{}", fleet_type));
                } else {
                    warnings.push(ValidationIssue::new(
                        ValidationErrorKind::FleetTypeIncompatible,
                        format!(
                            "fleet type '{}' is not available for {} on provider '{}'",
                            fleet_type, api, provider.name
                        ),
                    ));
                }
            }
        }
    }

    if level == ValidationLevel::Strict {
        errors.append(&mut warnings);
    }

    ValidationReport {
        provider: provider.name.clone(),
        level,
        valid: errors.is_empty(),
        errors,
        warnings,
        supported_features,
        checks_evaluated,
    }
}
