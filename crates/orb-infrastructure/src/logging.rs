//! Structured logging with tracing
//!
//! One console layer, plus a daily-rotated file layer when
//! `logging.file_output` is set. Both share the format chosen by
//! `logging.json_format`; the file layer never emits ANSI colors.
//!
//! `ORB_LOG` takes a full `EnvFilter` directive
//! (`orb_infrastructure::resilience=debug,info`) and wins over `logging.level`.

use crate::constants::{DEFAULT_LOG_FILE_STEM, LOG_FILTER_ENV};
use orb_domain::error::{Error, Result};
use std::ffi::OsStr;
use std::path::Path;

pub use crate::config::LoggingConfig;
use tracing::{Level, info, warn};
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber
///
/// Fails on an unknown level or if a subscriber is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let mut layers: Vec<BoxedLayer> = vec![console_layer(config.json_format)];
    if let Some(path) = &config.file_output {
        layers.push(file_layer(rolling_appender(path), config.json_format));
    }

    Registry::default()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| Error::Configuration {
            message: format!("Failed to install logging subscriber: {e}"),
            source: None,
        })?;

    info!(
        level = %level,
        json = config.json_format,
        file = ?config.file_output,
        "Logging initialized"
    );
    Ok(())
}

fn console_layer(json: bool) -> BoxedLayer {
    let layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);
    if json { layer.json().boxed() } else { layer.boxed() }
}

fn file_layer(appender: RollingFileAppender, json: bool) -> BoxedLayer {
    let layer = fmt::layer().with_writer(appender).with_ansi(false).with_target(true);
    if json { layer.json().boxed() } else { layer.boxed() }
}

fn rolling_appender(path: &Path) -> RollingFileAppender {
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let stem = path.file_stem().unwrap_or(OsStr::new(DEFAULT_LOG_FILE_STEM));
    tracing_appender::rolling::daily(directory, stem)
}

/// Parse a level name (`warning` is accepted for `warn`)
pub fn parse_log_level(level: &str) -> Result<Level> {
    let parsed = match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        other => {
            return Err(Error::Configuration {
                message: format!(
                    "Unknown log level '{other}' (expected trace, debug, info, warn or error)"
                ),
                source: None,
            });
        }
    };
    Ok(parsed)
}

/// Report whether a configuration file was merged
pub fn log_config_loaded(config_path: &Path, success: bool) {
    if success {
        info!(path = %config_path.display(), "Loaded configuration file");
    } else {
        warn!(path = %config_path.display(), "Configuration file not found, using defaults");
    }
}
