//! Minimal backend for trying the balancer locally.
//!
//! Every request is answered with `200 All good from server <port>`.

use std::net::SocketAddr;

use axum::{extract::State, routing::any, Router};
use clap::Parser;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "demo-backend")]
#[command(about = "Demo replica answering every request with its port", long_about = None)]
struct Cli {
    /// Port to listen on.
    #[arg(short, long, default_value_t = 8081)]
    port: u16,
}

async fn hello(State(port): State<u16>) -> String {
    tracing::info!(port, "Hit");
    format!("All good from server {}\n", port)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "demo_backend=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));

    let app = Router::new()
        .route("/", any(hello))
        .route("/{*path}", any(hello))
        .with_state(cli.port);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "Demo backend listening");
    axum::serve(listener, app).await?;
    Ok(())
}
