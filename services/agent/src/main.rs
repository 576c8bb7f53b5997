//! lbsync Resync Agent
//!
//! Reconciles desired loadbalancer configuration from the control plane
//! against an appliance fleet:
//!
//! - **Resync loop**: snapshots both sides, diffs them hierarchically,
//!   re-deploys missing services, removes orphans, reports drift
//! - **Fleet**: an explicit owned collection of device handles and their
//!   read/write seams (in-memory mock devices until a vendor driver lands
//!   behind the same traits)

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod client;
mod config;
mod fleet;
mod resync;

use client::ControlPlaneClient;
use fleet::Fleet;
use resync::{ResyncConfig, ResyncRunner};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting lbsync resync agent");

    // Load configuration
    let config = config::Config::from_env()?;
    info!(
        agent_id = %config.agent_id,
        control_plane_url = %config.control_plane_url,
        partition = %config.partition,
        resync_interval_secs = config.resync_interval_secs,
        "Configuration loaded"
    );

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // The fleet (mock devices for now)
    let fleet = Arc::new(Fleet::mock(config.mock_fleet_size, &config.partition));
    info!(device_count = config.mock_fleet_size, "Fleet initialized");

    let client = Arc::new(ControlPlaneClient::new(&config));

    let runner = ResyncRunner::new(
        client,
        fleet,
        ResyncConfig {
            interval: Duration::from_secs(config.resync_interval_secs),
        },
    );

    let runner_handle = tokio::spawn(async move {
        runner.run(shutdown_rx).await;
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    if let Err(e) = shutdown_tx.send(true) {
        error!(error = %e, "Failed to signal shutdown");
    }

    runner_handle.await?;
    info!("Agent stopped");

    Ok(())
}
