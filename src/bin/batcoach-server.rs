//! Live batting coach: WebSocket server that analyzes frames and speaks tips.
//!
//! Usage: batcoach-server [--config batcoach.toml] [--listen 0.0.0.0:8000]
//!
//! Without a config file the server runs offline: scripted tips, no audio,
//! and only client-side landmarks are analyzed.

use std::path::PathBuf;

use batcoach::{Config, Server};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overriding the config file.
    #[arg(short, long)]
    listen: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(addr) = args.listen {
        config.listen_addr = addr;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(
        shot = %config.shot,
        handedness = %config.handedness,
        cooldown_secs = config.repeat_cooldown_secs,
        "starting batcoach"
    );

    let services = config.build_services()?;
    let server = Server::bind(&config.listen_addr, services, config.session_settings())?;
    server.serve()?;
    Ok(())
}
