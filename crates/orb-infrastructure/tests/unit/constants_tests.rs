//! Constants Tests

use orb_infrastructure::constants::*;

#[test]
fn test_config_constants() {
    assert_eq!(DEFAULT_CONFIG_FILENAME, "orb.toml");
    assert_eq!(DEFAULT_CONFIG_DIR, "orb");
    assert_eq!(CONFIG_ENV_PREFIX, "ORB");
    assert_eq!(CONFIG_ENV_NESTING_SEPARATOR, "__");
}

#[test]
fn test_resilience_constants_are_consistent() {
    assert!(RETRY_DEFAULT_ATTEMPTS >= 1);
    assert!(RETRY_BASE_DELAY_MS <= RETRY_MAX_DELAY_MS);
    assert!(CIRCUIT_BREAKER_FAILURE_THRESHOLD > 0);
    assert!(PROVIDER_MAX_CONCURRENT_CALLS > 0);
}

#[test]
fn test_reconciliation_constants_are_consistent() {
    assert!(RECONCILE_POLL_JITTER_MS < RECONCILE_POLL_INTERVAL_SECS * 1000);
    assert!(RECONCILE_POLL_INTERVAL_SECS < REQUEST_TIMEOUT_SECS);
    assert!(RECONCILE_MAX_FAILED_POLLS > 0);
}
