//! Binary entry point for the VitalMesh pipeline.

use anyhow::Context;
use ews_runtime::{AppConfig, Container};
use ews_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let telemetry_config = TelemetryConfig::from_env();
    let _telemetry = init_telemetry(&telemetry_config).context("telemetry init failed")?;

    let config = AppConfig::from_env();
    info!(port = config.port, env = ?config.node_env, "Starting VitalMesh pipeline");

    let container = Container::build(&config)
        .map_err(anyhow::Error::msg)
        .context("container build failed")?;

    info!("Pipeline running; press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    container.shutdown();
    info!("Bye");
    Ok(())
}
