//! Configuration loader
//!
//! Loads configuration from defaults, a TOML file and environment
//! variables, then validates the merged result.

use crate::config::AppConfig;
use crate::constants::*;
use crate::error_ext::ErrorContext;
use crate::logging::{log_config_loaded, parse_log_level};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use orb_domain::error::{Error, Result};
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader service
#[derive(Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources
    ///
    /// Configuration sources are merged in this order (later sources override earlier):
    /// 1. Default values from `AppConfig::default()`
    /// 2. TOML configuration file (if exists)
    /// 3. Environment variables with prefix (e.g., `ORB_RESILIENCE__RETRY_ATTEMPTS`)
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if let Some(config_path) = &self.config_path {
            if config_path.exists() {
                figment = figment.merge(Toml::file(config_path));
                log_config_loaded(config_path, true);
            } else {
                log_config_loaded(config_path, false);
            }
        } else if let Some(default_path) = Self::find_default_config_path() {
            figment = figment.merge(Toml::file(&default_path));
            log_config_loaded(&default_path, true);
        }

        // Double underscore separates nested keys; single underscores stay in field names
        figment = figment.merge(
            Env::prefixed(&format!("{}_", self.env_prefix)).split(CONFIG_ENV_NESTING_SEPARATOR),
        );

        let app_config: AppConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;

        self.validate_config(&app_config)?;

        Ok(app_config)
    }

    /// Reload configuration (used for provider hot-reload)
    pub fn reload(&self) -> Result<AppConfig> {
        self.load()
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string)
            .io_context(format!("Failed to write config file {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get the current configuration file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Find default configuration file paths to try
    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;

        let candidates = vec![
            current_dir.join(DEFAULT_CONFIG_FILENAME),
            current_dir
                .join(DEFAULT_CONFIG_DIR)
                .join(DEFAULT_CONFIG_FILENAME),
            dirs::config_dir()
                .map(|d| d.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|d| {
                    d.join(format!(".{}", DEFAULT_CONFIG_DIR))
                        .join(DEFAULT_CONFIG_FILENAME)
                })
                .unwrap_or_default(),
        ];

        candidates
            .into_iter()
            .find(|path| !path.as_os_str().is_empty() && path.exists())
    }

    /// Validate configuration values
    fn validate_config(&self, config: &AppConfig) -> Result<()> {
        validate_app_config(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate application configuration
///
/// Performs validation of all configuration sections.
pub fn validate_app_config(config: &AppConfig) -> Result<()> {
    parse_log_level(&config.logging.level)?;
    validate_providers(config)?;
    validate_templates(config)?;
    validate_resilience_config(config)?;
    validate_reconciliation_config(config)?;
    Ok(())
}

fn configuration_error(message: impl Into<String>) -> Error {
    Error::Configuration {
        message: message.into(),
        source: None,
    }
}

fn validate_providers(config: &AppConfig) -> Result<()> {
    if config.providers.is_empty() {
        return Err(configuration_error(
            "At least one provider instance must be configured",
        ));
    }
    let mut names = HashSet::new();
    for provider in &config.providers {
        if provider.name.trim().is_empty() {
            return Err(configuration_error("Provider name cannot be empty"));
        }
        if !names.insert(provider.name.as_str()) {
            return Err(configuration_error(format!(
                "Duplicate provider name '{}'",
                provider.name
            )));
        }
        if provider.enabled && provider.weight == 0 {
            return Err(configuration_error(format!(
                "Provider '{}' is enabled with weight 0",
                provider.name
            )));
        }
    }
    if let Some(default) = &config.selection.default_provider {
        if config.provider(default).is_none() {
            return Err(configuration_error(format!(
                "Default provider '{}' is not configured",
                default
            )));
        }
    }
    Ok(())
}

fn validate_templates(config: &AppConfig) -> Result<()> {
    let mut ids = HashSet::new();
    for template in &config.templates {
        if !ids.insert(template.template_id.as_str()) {
            return Err(configuration_error(format!(
                "Duplicate template id '{}'",
                template.template_id
            )));
        }
        if let Some(name) = &template.provider_name {
            if config.provider(name).is_none() {
                return Err(configuration_error(format!(
                    "Template '{}' names unknown provider '{}'",
                    template.template_id, name
                )));
            }
        }
    }
    Ok(())
}

fn validate_resilience_config(config: &AppConfig) -> Result<()> {
    let resilience = &config.resilience;
    if resilience.retry_attempts == 0 {
        return Err(configuration_error("Retry attempts cannot be 0"));
    }
    if resilience.circuit_breaker_failure_threshold == 0 {
        return Err(configuration_error(
            "Circuit breaker failure threshold cannot be 0",
        ));
    }
    if resilience.max_concurrent_calls == 0 {
        return Err(configuration_error(
            "Concurrent calls per provider cannot be 0",
        ));
    }
    if resilience.retry_max_delay_ms < resilience.retry_base_delay_ms {
        return Err(configuration_error(
            "Maximum retry delay cannot be below the base delay",
        ));
    }
    Ok(())
}

fn validate_reconciliation_config(config: &AppConfig) -> Result<()> {
    let reconciliation = &config.reconciliation;
    if reconciliation.poll_interval_secs == 0 {
        return Err(configuration_error("Poll interval cannot be 0"));
    }
    if reconciliation.scan_interval_secs == 0 {
        return Err(configuration_error("Scan interval cannot be 0"));
    }
    if reconciliation.request_timeout_secs == 0 {
        return Err(configuration_error("Request timeout cannot be 0"));
    }
    if reconciliation.max_failed_polls == 0 {
        return Err(configuration_error("Maximum failed polls cannot be 0"));
    }
    Ok(())
}
