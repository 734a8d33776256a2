//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the balancing handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Start one health monitor per service
//! - Bind server to listener and serve until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::validation::validate_config;
use crate::config::{BalancerConfig, ConfigError};
use crate::health;
use crate::http::balancer::{LoadBalancer, ProxyError};
use crate::http::forward::{Forwarder, HttpForwarder};
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::lifecycle::Shutdown;
use crate::routing::Router as ServiceRouter;

/// HTTP front end of the load balancer.
pub struct HttpServer<F = HttpForwarder> {
    router: Router,
    config: BalancerConfig,
    balancer: Arc<LoadBalancer<F>>,
}

impl HttpServer<HttpForwarder> {
    /// Create a new HTTP server forwarding through a hyper client.
    pub fn new(config: BalancerConfig) -> Result<Self, ConfigError> {
        let forwarder = HttpForwarder::new(Duration::from_secs(config.timeouts.connect_secs));
        Self::with_forwarder(config, forwarder)
    }
}

impl<F: Forwarder> HttpServer<F> {
    /// Create a new HTTP server with a custom forwarder.
    ///
    /// The configuration is validated here as well, whatever source it came from.
    pub fn with_forwarder(config: BalancerConfig, forwarder: F) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let service_router = Arc::new(ServiceRouter::from_config(&config.services, config.strategy)?);
        let balancer = Arc::new(LoadBalancer::new(service_router, forwarder));
        let router = Self::build_router(&config, balancer.clone());
        Ok(Self {
            router,
            config,
            balancer,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &BalancerConfig, balancer: Arc<LoadBalancer<F>>) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request),
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        Router::new()
            .route("/{*path}", any(proxy_handler::<F>))
            .route("/", any(proxy_handler::<F>))
            .with_state(balancer)
            .layer(middleware)
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Health monitors run alongside and stop with the server on shutdown.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            services = self.balancer.router().services().len(),
            "HTTP server starting"
        );

        for service in self.balancer.router().services() {
            tracing::info!(
                service = %service.name,
                matcher = %service.matcher.prefix(),
                backends = ?service.backend_states(),
                "Service ready"
            );
        }

        let monitors = health::spawn_monitors(self.balancer.router(), &self.config.health_check, &shutdown);

        let mut server_shutdown = shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                server_shutdown.recv().await;
            })
            .await?;

        for monitor in monitors {
            if let Err(e) = monitor.await {
                tracing::error!(error = %e, "Health monitor task failed");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler: resolve, pick, forward.
async fn proxy_handler<F: Forwarder>(
    State(balancer): State<Arc<LoadBalancer<F>>>,
    request: Request<Body>,
) -> Result<Response<Body>, ProxyError> {
    balancer.handle(request).await
}
