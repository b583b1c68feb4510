//! Serve command for running the status push server
//!
//! Loads the layered configuration, applies command-line overrides and
//! serves the `/services` and `/sysinfo` namespaces until interrupted.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use pulse_server::PulseServer;
use tracing::{info, warn};

use crate::config::{ConfigLoader, PulseConfig};

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Directory holding index.html and static/ (overrides config)
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the user/project layers
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl ServeArgs {
    /// Apply command-line overrides on top of loaded configuration
    fn apply(&self, mut config: PulseConfig) -> PulseConfig {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = &self.static_dir {
            config.server.static_dir = dir.clone();
        }
        config
    }
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let loaded = match &args.config {
        Some(path) => ConfigLoader::load_from_path(path)?,
        None => ConfigLoader::load()?,
    };
    let config = args.apply(loaded).to_server_config();

    info!("Starting pulse server on {}", config.addr());

    let server = PulseServer::new(config)?;
    let shutdown = server.shutdown_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Interrupt received, shutting down"),
            Err(e) => warn!("Failed to listen for interrupt: {}", e),
        }
        shutdown.cancel();
    });

    server.run().await.map_err(Into::into)
}
