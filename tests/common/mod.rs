//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use service_balancer::config::{BalancerConfig, ReplicaConfig, ServiceConfig};
use service_balancer::http::HttpServer;
use service_balancer::load_balancer::StrategyKind;
use service_balancer::Shutdown;

/// Start a mock backend on an ephemeral port that answers every request with `body`.
pub async fn start_mock_backend(body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        // Drain the request head before answering
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// One replica with an optional weight tag.
pub fn replica(addr: SocketAddr, weight: Option<u32>) -> ReplicaConfig {
    let mut replica = ReplicaConfig {
        url: format!("http://{}", addr),
        metadata: Default::default(),
    };
    if let Some(w) = weight {
        replica.metadata.insert("weight".into(), w.to_string());
    }
    replica
}

pub fn service(name: &str, matcher: &str, strategy: StrategyKind, replicas: Vec<ReplicaConfig>) -> ServiceConfig {
    ServiceConfig {
        name: name.into(),
        matcher: matcher.into(),
        strategy: Some(strategy),
        replicas,
    }
}

/// Start the balancer on an ephemeral port. Returns its address and shutdown handle.
pub async fn start_balancer(mut config: BalancerConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(100)).await;
    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
