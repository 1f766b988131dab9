//! Banking gateway (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                    GATEWAY                       │
//!   Client Request   │  ┌────────────┐   ┌────────────┐   ┌──────────┐  │
//!   ─────────────────┼─▶│ request id │──▶│    gate    │──▶│ handlers │  │
//!                    │  │  + trace   │   │ allow-list │   │ session  │  │
//!                    │  └────────────┘   │ rate limit │   │ profile  │  │
//!                    │                   │ bearer JWT │   └────┬─────┘  │
//!                    │                   └─────┬──────┘        │        │
//!                    │                         ▼               ▼        │
//!                    │                   ┌────────────┐   ┌──────────┐  │
//!   Client Response  │                   │ directory  │   │  cipher  │  │
//!   ◀────────────────┼───────────────────│  (lookup)  │   │ cookies  │  │
//!                    │                   └────────────┘   └──────────┘  │
//!                    └──────────────────────────────────────────────────┘
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use bank_gateway::config::{load_config, ObservabilityConfig};
use bank_gateway::directory::InMemoryUserDirectory;
use bank_gateway::observability::{logging, metrics};
use bank_gateway::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "bank-gateway")]
#[command(about = "Request gate and payload protection for the banking API", long_about = None)]
struct Args {
    /// Path to a TOML config file. Secrets may come from the environment.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init(&ObservabilityConfig::default().log_filter);
            tracing::error!(error = %e, "Configuration rejected, refusing to start");
            return Err(e.into());
        }
    };

    logging::init(&config.observability.log_filter);
    tracing::info!("bank-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let directory = InMemoryUserDirectory::from_seed(&config.directory.users);
    if directory.is_empty() {
        tracing::warn!("User directory is empty; every login will fail");
    }

    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config, Arc::new(directory))?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
