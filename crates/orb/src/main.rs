//! Open Resource Broker - Entry Point
//!
//! Runs the broker as a daemon: active requests are reconciled on a jittered
//! schedule until the process receives Ctrl-C.

// Force-link orb-providers to ensure linkme inventory registrations are included
extern crate orb_providers;

use clap::Parser;

/// Command line interface for the Open Resource Broker
#[derive(Parser, Debug)]
#[command(name = "orb")]
#[command(about = "Open Resource Broker - Multi-Provider Compute Provisioning")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<std::path::PathBuf>,

    /// Validate configuration and provider adapters, then exit
    #[arg(long)]
    pub check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    orb::run(cli.config.as_deref(), cli.check).await
}
