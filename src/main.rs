//! Edge Gateway
//!
//! The network edge of a location-aware authentication platform, built with
//! Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                   EDGE GATEWAY                   │
//!                         │                                                  │
//!   Client Request        │  ┌──────────┐    ┌──────────┐    ┌───────────┐   │
//!   ──────────────────────┼─▶│   http   │───▶│  proxy   │───▶│ forwarder │───┼──▶ Backend
//!                         │  │  server  │    │  target  │    │  + CORS   │   │    Origin
//!                         │  └────┬─────┘    └──────────┘    └───────────┘   │
//!                         │       │                                          │
//!                         │       ▼  /edge/client                            │
//!                         │  ┌──────────┐    ┌──────────┐    ┌───────────┐   │
//!                         │  │ address  │───▶│ location │───▶│  ipapi    │───┼──▶ Geolocation
//!                         │  │ extract  │    │ resolver │    │  lookup   │   │    Service
//!                         │  └──────────┘    └──────────┘    └───────────┘   │
//!                         │                  ┌──────────┐                    │
//!                         │                  │  device  │                    │
//!                         │                  │  rules   │                    │
//!                         │                  └──────────┘                    │
//!                         │                                                  │
//!                         │  config · observability · resilience · lifecycle │
//!                         └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use edge_gateway::config::load_config;
use edge_gateway::lifecycle;
use edge_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "edge-gateway")]
#[command(about = "Client fingerprinting and transparent API proxy edge", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults and environment are used without it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!("edge-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    lifecycle::run(config).await?;
    Ok(())
}
