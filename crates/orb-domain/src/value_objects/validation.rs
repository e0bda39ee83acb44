//! Capability validation levels and reports

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result, ValidationIssue};

/// Strictness of capability validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    /// Every warning is promoted to an error
    #[serde(alias = "STRICT")]
    Strict,
    /// Warnings are reported but not fatal
    #[default]
    #[serde(alias = "LENIENT")]
    Lenient,
    /// Only the API-support check runs
    #[serde(alias = "BASIC")]
    Basic,
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Strict => "STRICT",
            Self::Lenient => "LENIENT",
            Self::Basic => "BASIC",
        };
        f.write_str(name)
    }
}

impl FromStr for ValidationLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            "basic" => Ok(Self::Basic),
            _ => Err(Error::invalid_argument(format!(
                "Unknown validation level: {}",
                s
            ))),
        }
    }
}

/// Result of validating a template against one provider instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Provider instance validated against
    pub provider: String,
    /// Level used
    pub level: ValidationLevel,
    /// Whether no blocking findings were produced
    pub valid: bool,
    /// Blocking findings
    pub errors: Vec<ValidationIssue>,
    /// Non-blocking findings
    pub warnings: Vec<ValidationIssue>,
    /// Template features the provider was confirmed to support
    pub supported_features: Vec<String>,
    /// Checks that were evaluated
    pub checks_evaluated: u32,
}

impl ValidationReport {
    /// Total number of findings
    pub fn issue_count(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }

    /// Fraction of evaluated checks that passed
    pub fn score(&self) -> f64 {
        if self.checks_evaluated == 0 {
            return 1.0;
        }
        let failed = self.issue_count() as f64;
        let total = f64::from(self.checks_evaluated);
        ((total - failed) / total).max(0.0)
    }

    /// Convert a failed report into a validation error
    pub fn into_result(self) -> Result<Self> {
        if self.valid {
            Ok(self)
        } else {
            Err(Error::Validation {
                provider: self.provider,
                issues: self.errors,
            })
        }
    }
}
