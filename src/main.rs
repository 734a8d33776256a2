//! Path-prefix HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌────────────────────────────────────────────────────┐
//!                          │                   LOAD BALANCER                    │
//!                          │                                                    │
//!     Client Request       │  ┌─────────┐   ┌──────────┐   ┌───────────────┐    │
//!     ─────────────────────┼─▶│  http   │──▶│ routing  │──▶│ load_balancer │    │
//!                          │  │ server  │   │ (prefix) │   │  (strategy)   │    │
//!                          │  └─────────┘   └──────────┘   └───────┬───────┘    │
//!                          │                                       │            │
//!                          │                                       ▼            │
//!     Client Response      │  ┌─────────┐                  ┌───────────────┐    │
//!     ◀────────────────────┼──│  http   │◀─────────────────│   forwarder   │◀───┼──── Backend
//!                          │  │ server  │                  │ (hyper client)│    │     Replica
//!                          │  └─────────┘                  └───────────────┘    │
//!                          │                                                    │
//!                          │  ┌──────────────────────────────────────────────┐  │
//!                          │  │ health monitor per service → backend liveness│  │
//!                          │  └──────────────────────────────────────────────┘  │
//!                          └────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use service_balancer::config::{ConfigSource, FileConfigSource, ObservabilityConfig};
use service_balancer::http::HttpServer;
use service_balancer::lifecycle::{signals, Shutdown};
use service_balancer::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "service-balancer")]
#[command(about = "Routes HTTP requests to service replicas by path prefix", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "./config/balancer.toml")]
    config: PathBuf,

    /// Override the listener port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logging reads the observability section; a load error is reported once logging is up.
    let source = FileConfigSource::new(&cli.config);
    let loaded = source.load();
    let observability = loaded
        .as_ref()
        .map(|c| c.observability.clone())
        .unwrap_or_else(|_| ObservabilityConfig::default());
    logging::init(&observability)?;

    tracing::info!("service-balancer v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = %source.path().display(), error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };

    if let Some(port) = cli.port {
        let addr: SocketAddr = config.listener.bind_address.parse()?;
        config.listener.bind_address = SocketAddr::new(addr.ip(), port).to_string();
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        services = config.services.len(),
        default_strategy = %config.strategy,
        health_interval_secs = config.health_check.interval_secs,
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
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;
    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
