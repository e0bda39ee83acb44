//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.
//! Domain-specific constants are defined in `orb_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "orb.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "orb";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "ORB";

/// Separator for nested keys in environment variables (`ORB_RESILIENCE__RETRY_ATTEMPTS`)
pub const CONFIG_ENV_NESTING_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the log filter
pub const LOG_FILTER_ENV: &str = "ORB_LOG";

/// File stem used when the configured log path has none
pub const DEFAULT_LOG_FILE_STEM: &str = "orb";

// ============================================================================
// RESILIENCE CONSTANTS
// ============================================================================

/// Attempts per provider call, including the first
pub const RETRY_DEFAULT_ATTEMPTS: u32 = 3;

/// Backoff before the first retry, in milliseconds
pub const RETRY_BASE_DELAY_MS: u64 = 200;

/// Upper bound of the exponential backoff, in milliseconds
pub const RETRY_MAX_DELAY_MS: u64 = 10_000;

/// Upper bound of the random jitter added to each backoff, in milliseconds
pub const RETRY_JITTER_MS: u64 = 100;

/// Consecutive transient failures that open a provider's circuit
pub const CIRCUIT_BREAKER_FAILURE_THRESHOLD: u32 = 5;

/// Seconds an open circuit waits before allowing a trial call
pub const CIRCUIT_BREAKER_RECOVERY_TIMEOUT_SECS: u64 = 60;

/// Concurrent calls allowed per provider instance
pub const PROVIDER_MAX_CONCURRENT_CALLS: usize = 8;

// ============================================================================
// RECONCILIATION CONSTANTS
// ============================================================================

/// Seconds between reconciliation polls of one request
pub const RECONCILE_POLL_INTERVAL_SECS: u64 = 15;

/// Maximum random deviation of the poll interval, in milliseconds
pub const RECONCILE_POLL_JITTER_MS: u64 = 3_000;

/// Seconds between storage scans for untracked active requests
pub const RECONCILE_SCAN_INTERVAL_SECS: u64 = 60;

/// Seconds a request may stay active before timing out (30 minutes)
pub const REQUEST_TIMEOUT_SECS: u64 = 1_800;

/// Consecutive failed polls before a request fails
pub const RECONCILE_MAX_FAILED_POLLS: u32 = 10;

/// Reload-and-retry attempts after a storage version conflict
pub const VERSION_CONFLICT_RETRIES: u32 = 3;
