use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use robocup_bridge::{Bridge, BridgeConfig};

/// Bridge a humanoid control stack to the RoboCup virtual-league simulator.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Bridge configuration (joints, sensor periods, IMU frames).
    #[arg(short, long, default_value = "config/wolfgang.yaml")]
    config: PathBuf,

    /// Simulator `host:port`, overriding the file and ROBOCUP_SIMULATOR_ADDR.
    #[arg(short, long)]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = BridgeConfig::load(&cli.config, cli.address)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let (channels, mut session) = Bridge::connect(&config)
        .await
        .with_context(|| format!("connecting to simulator at {}", config.address))?;

    tokio::select! {
        joined = &mut session => {
            let summary = joined.context("session task panicked")??;
            info!(
                "Simulator session finished after {} ticks ({} over budget)",
                summary.ticks, summary.late_ticks
            );
            return Ok(());
        }
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => {
                info!("Interrupted, stopping after the current tick");
                channels.shutdown();
            }
            Err(e) => {
                warn!("Cannot listen for Ctrl-C, running until the simulator disconnects: {}", e)
            }
        }
    }

    let summary = session.await.context("session task panicked")??;
    info!("Stopped after {} ticks", summary.ticks);
    Ok(())
}
