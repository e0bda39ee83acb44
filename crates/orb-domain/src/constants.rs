//! Domain layer constants
//!
//! Defaults that are part of the broker's domain logic. Runtime tuning
//! (timeouts, backoff, pool sizes) lives in `orb-infrastructure`.

// ============================================================================
// PROVIDER DEFAULTS
// ============================================================================

/// Priority assigned to provider instances that do not set one (lower wins)
pub const PROVIDER_DEFAULT_PRIORITY: u32 = 100;

/// Weight assigned to provider instances that do not set one
pub const PROVIDER_DEFAULT_WEIGHT: u32 = 1;

/// Per-request instance limit assumed when a provider does not advertise one
pub const PROVIDER_DEFAULT_MAX_INSTANCES_PER_REQUEST: u32 = 1000;

// ============================================================================
// REQUEST DEFAULTS
// ============================================================================

/// Instance count used by templates that do not specify one
pub const TEMPLATE_DEFAULT_INSTANCE_COUNT: u32 = 1;

/// Prefix of generated request identifiers
pub const REQUEST_ID_PREFIX: &str = "req-";

// ============================================================================
// SELECTION CONFIDENCE
// ============================================================================

/// Confidence of an explicit or configured-default choice
pub const CONFIDENCE_EXPLICIT: f64 = 1.0;

/// Confidence of a priority choice with a unique minimum
pub const CONFIDENCE_PRIORITY: f64 = 0.9;

/// Confidence of a priority choice among tied minimums
pub const CONFIDENCE_PRIORITY_TIED: f64 = 0.7;

/// Confidence of the first-enabled fallback policy
pub const CONFIDENCE_DEFAULT_POLICY: f64 = 0.8;
