//! Error handling types

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Provider selection failures, surfaced synchronously at request creation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// No enabled provider instance is eligible in the given scope
    #[error("No enabled providers available ({scope})")]
    NoEnabledProviders {
        /// Scope that was searched (e.g. "type=aws", "all")
        scope: String,
    },

    /// Explicitly named provider instance does not exist
    #[error("Provider instance '{name}' not found")]
    ProviderNotFound {
        /// Requested instance name
        name: String,
    },

    /// Explicitly named provider instance exists but is disabled
    #[error("Provider instance '{name}' is disabled")]
    ProviderDisabled {
        /// Requested instance name
        name: String,
    },

    /// No enabled provider instance advertises the required capability
    #[error("No provider instance supports {requirement}")]
    NoCompatibleProvider {
        /// Human-readable requirement (e.g. "api=EC2Fleet")
        requirement: String,
    },
}

/// Kind of a capability validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// Provider does not support the requested API
    ApiNotSupported,
    /// Requested count exceeds the provider's per-request maximum
    InstanceLimitExceeded,
    /// Provider does not support the requested pricing model
    PricingModelMismatch,
    /// Provider does not support the requested fleet sub-type
    FleetTypeIncompatible,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ApiNotSupported => "api_not_supported",
            Self::InstanceLimitExceeded => "instance_limit_exceeded",
            Self::PricingModelMismatch => "pricing_model_mismatch",
            Self::FleetTypeIncompatible => "fleet_type_incompatible",
        };
        f.write_str(name)
    }
}

/// A single validation finding (error or warning)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Finding category
    pub kind: ValidationErrorKind,
    /// Human-readable description
    pub message: String,
}

impl ValidationIssue {
    /// Create a new validation finding
    pub fn new<S: Into<String>>(kind: ValidationErrorKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Classification every provider adapter error must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// Retryable (throttling, timeouts, 5xx)
    Transient,
    /// Not retryable (bad parameters, missing permissions, unknown resource)
    Permanent,
    /// Rejected locally because the provider's circuit is open
    CircuitOpen,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transient => "transient",
            Self::Permanent => "permanent",
            Self::CircuitOpen => "circuit_open",
        };
        f.write_str(name)
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Main error type for the resource broker
#[derive(Error, Debug)]
pub enum Error {
    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Resource not found error
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Invalid argument provided to a function
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// Operation not allowed in the entity's current state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Description of the rejected transition
        message: String,
    },

    /// Provider selection failed
    #[error("Provider selection failed: {0}")]
    Selection(#[from] SelectionError),

    /// Template failed capability validation against a provider instance
    #[error("Validation failed for provider '{provider}': {}", join_issues(.issues))]
    Validation {
        /// Provider instance the template was validated against
        provider: String,
        /// Blocking findings
        issues: Vec<ValidationIssue>,
    },

    /// Provider adapter call failed
    #[error("Provider '{provider}' {kind} error: {message}")]
    Provider {
        /// Provider instance name
        provider: String,
        /// Error classification
        kind: ProviderErrorKind,
        /// Description of the failure
        message: String,
    },

    /// Resource handle no longer exists on the provider
    #[error("Resource '{handle}' no longer exists on the provider")]
    ResourceNotFound {
        /// Opaque resource handle
        handle: String,
    },

    /// Some resource handles of a request could not be discovered this cycle
    #[error("Discovery failed for {failed} of {total} resources: {message}")]
    PartialDiscoveryFailure {
        /// Handles whose discovery failed
        failed: usize,
        /// Handles polled
        total: usize,
        /// Last observed failure
        message: String,
    },

    /// Primary provider and every viable alternative failed
    #[error("All provider instances exhausted ({}): {last}", .attempted.join(", "))]
    ProvidersExhausted {
        /// Instances that were tried, in order
        attempted: Vec<String>,
        /// Last observed error
        #[source]
        last: Box<Error>,
    },

    /// A provider call was not started because its request was cancelled
    #[error("Request cancelled before {operation}")]
    Cancelled {
        /// Call that was skipped
        operation: String,
    },

    /// Optimistic concurrency check failed on a persisted entity
    #[error("Version conflict on {entity} '{id}': expected {expected}, found {actual}")]
    VersionConflict {
        /// Entity kind (request, machine, template)
        entity: String,
        /// Entity identifier
        id: String,
        /// Version the writer based its change on
        expected: u64,
        /// Version currently stored
        actual: u64,
    },

    /// Configuration-related error (simple form)
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
    },

    /// Configuration-related error (with source)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },

    /// Infrastructure operation error
    #[error("Infrastructure error: {message}")]
    Infrastructure {
        /// Description of the infrastructure error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

// Basic error creation methods
impl Error {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state<S: Into<String>>(message: S) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// Provider and reconciliation error creation methods
impl Error {
    /// Create a cancellation error for a skipped call
    pub fn cancelled<S: Into<String>>(operation: S) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Create a retryable provider error
    pub fn transient<P: Into<String>, S: Into<String>>(provider: P, message: S) -> Self {
        Self::Provider {
            provider: provider.into(),
            kind: ProviderErrorKind::Transient,
            message: message.into(),
        }
    }

    /// Create a non-retryable provider error
    pub fn permanent<P: Into<String>, S: Into<String>>(provider: P, message: S) -> Self {
        Self::Provider {
            provider: provider.into(),
            kind: ProviderErrorKind::Permanent,
            message: message.into(),
        }
    }

    /// Create a fail-fast rejection for an open circuit
    pub fn circuit_open<P: Into<String>>(provider: P) -> Self {
        let provider = provider.into();
        Self::Provider {
            message: format!("circuit for '{}' is open", provider),
            provider,
            kind: ProviderErrorKind::CircuitOpen,
        }
    }

    /// Create a vanished-resource error
    pub fn resource_not_found<S: Into<String>>(handle: S) -> Self {
        Self::ResourceNotFound {
            handle: handle.into(),
        }
    }

    /// Create a version conflict error
    pub fn version_conflict<E: Into<String>, I: Into<String>>(
        entity: E,
        id: I,
        expected: u64,
        actual: u64,
    ) -> Self {
        Self::VersionConflict {
            entity: entity.into(),
            id: id.into(),
            expected,
            actual,
        }
    }
}

// Configuration and infrastructure error creation methods
impl Error {
    /// Create a configuration error (simple)
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an infrastructure error
    pub fn infrastructure<S: Into<String>>(message: S) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: None,
        }
    }
}

// Classification used by the resilience layer and the orchestrator
impl Error {
    /// Provider classification, if this error came from a provider call
    pub fn provider_kind(&self) -> Option<ProviderErrorKind> {
        match self {
            Self::Provider { kind, .. } => Some(*kind),
            Self::ResourceNotFound { .. } => Some(ProviderErrorKind::Permanent),
            Self::PartialDiscoveryFailure { .. } => Some(ProviderErrorKind::Transient),
            Self::ProvidersExhausted { last, .. } => last.provider_kind(),
            _ => None,
        }
    }

    /// Whether a retry may succeed
    pub fn is_transient(&self) -> bool {
        self.provider_kind() == Some(ProviderErrorKind::Transient)
    }

    /// Whether retrying is pointless
    pub fn is_permanent(&self) -> bool {
        match self {
            Self::Selection(_) | Self::Validation { .. } => true,
            _ => self.provider_kind() == Some(ProviderErrorKind::Permanent),
        }
    }

    /// Whether the call was rejected by an open circuit
    pub fn is_circuit_open(&self) -> bool {
        self.provider_kind() == Some(ProviderErrorKind::CircuitOpen)
    }

    /// Whether an alternative provider instance may be tried
    pub fn allows_fallback(&self) -> bool {
        self.is_transient() || self.is_circuit_open()
    }

    /// Whether a call was skipped because its request was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Whether this is an optimistic-concurrency conflict
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::internal(s)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::internal(s)
    }
}
