//! hub-gate: filtering reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌────────────────────────────────────────────────────┐
//!                     │                      HUB-GATE                       │
//!                     │                                                     │
//!   Client Request    │  ┌─────────┐    ┌──────────┐    ┌──────────────┐   │
//!   ──────────────────┼─▶│  http   │───▶│ routing  │───▶│   security   │   │
//!   /https://gh/...   │  │ server  │    │ matcher  │    │ allow / deny │   │
//!                     │  └─────────┘    └──────────┘    └──────┬───────┘   │
//!                     │                                        │           │
//!                     │                                        ▼           │
//!   Client Response   │  ┌─────────┐    ┌──────────────────────────────┐   │
//!   ◀─────────────────┼──│ relay   │◀───│ proxy engine (redirect loop) │◀──┼── Upstream
//!                     │  └─────────┘    └──────────────────────────────┘   │
//!                     │                                                     │
//!                     │  config: TOML server settings + JSON access list   │
//!                     │  (ArcSwap snapshot, periodic reload)                │
//!                     └────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use hub_gate::config::loader::load_config;
use hub_gate::config::validation::validate_config;
use hub_gate::config::{ConfigError, ProxyConfig};
use hub_gate::lifecycle::{self, signals};
use hub_gate::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "hub-gate")]
#[command(about = "Filtering reverse proxy for GitHub, Hugging Face and CDN downloads", long_about = None)]
struct Cli {
    /// Server configuration file (TOML). Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override access.path (JSON allow/deny document).
    #[arg(short, long)]
    access_list: Option<String>,
}

fn resolve_config(cli: &Cli) -> Result<ProxyConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }
    if let Some(access_list) = &cli.access_list {
        config.access.path = access_list.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    logging::init(&config.observability);
    tracing::info!("hub-gate v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        access_list = %config.access.path,
        reload_interval_secs = config.access.reload_interval_secs,
        size_limit = config.limits.size_limit,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let running = lifecycle::start(config, listener).await?;
    tracing::info!(address = %running.local_addr(), "Listening for connections");

    let shutdown = running.shutdown().clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    running.wait().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
