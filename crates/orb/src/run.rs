//! Daemon Runner
//!
//! Loads configuration, initializes logging, builds the broker and keeps the
//! reconciliation scheduler running until the process is interrupted.

use orb_domain::error::Result;
use orb_infrastructure::config::{AppConfig, ConfigLoader};
use orb_infrastructure::logging::init_logging;
use orb_infrastructure::{AppContext, init_app};
use std::path::Path;
use tracing::{error, info, warn};

/// Load configuration from an explicit path or the default locations
pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig> {
    let loader = match config_path {
        Some(path) => ConfigLoader::new().with_config_path(path),
        None => ConfigLoader::new(),
    };
    loader.load()
}

/// Run the broker until Ctrl-C
///
/// With `check_only` the configuration is loaded and the broker is built,
/// then the process exits without scheduling reconciliation.
pub async fn run(
    config_path: Option<&Path>,
    check_only: bool,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    init_logging(config.logging.clone())?;

    let app = init_app(config).await?;
    info!(app = ?app, "Broker ready");
    if check_only {
        info!("Configuration check passed");
        return Ok(());
    }

    serve(&app).await?;
    Ok(())
}

async fn serve(app: &AppContext) -> Result<()> {
    let scheduler = app.scheduler();
    let picked_up = scheduler.scan().await?;
    info!(requests = picked_up, "Resumed active requests");
    let handle = scheduler.spawn();

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down reconciliation scheduler");
    scheduler.shutdown();
    if let Err(e) = handle.await {
        warn!(error = %e, "Scheduler task ended abnormally");
    }
    info!(in_flight = scheduler.tracked_count(), "Broker stopped");
    Ok(())
}
