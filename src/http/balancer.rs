//! Per-request composition of routing, strategy and forwarding.
//!
//! # Data Flow
//! ```text
//! Request
//!     → Router::resolve(path)        NoMatch  → 400
//!     → Service::next_backend()      AllDown  → 503
//!     → Forwarder::forward(backend)  error    → 502
//!     → backend response, verbatim
//! ```
//!
//! # Design Decisions
//! - Fail closed: no retry, no failover to another backend or service
//! - Error bodies carry only the status reason, never internal detail

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::response::IntoResponse;
use thiserror::Error;

use crate::http::forward::{ForwardError, Forwarder};
use crate::load_balancer::StrategyError;
use crate::observability::metrics;
use crate::routing::{RouteError, Router};

/// Request-path failures. Each maps to an HTTP status.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error(transparent)]
    NoRoute(#[from] RouteError),

    #[error("service '{service}': {source}")]
    NoHealthyBackend { service: String, source: StrategyError },

    #[error("service '{service}', backend {backend}: {source}")]
    Upstream {
        service: String,
        backend: String,
        source: ForwardError,
    },
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::NoRoute(_) => StatusCode::BAD_REQUEST,
            ProxyError::NoHealthyBackend { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        (status, status.canonical_reason().unwrap_or_default()).into_response()
    }
}

/// The composition root: routes each request to a backend and forwards it.
pub struct LoadBalancer<F> {
    router: Arc<Router>,
    forwarder: F,
}

impl<F: Forwarder> LoadBalancer<F> {
    pub fn new(router: Arc<Router>, forwarder: F) -> Self {
        Self { router, forwarder }
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Route and forward one request.
    pub async fn handle(&self, request: Request<Body>) -> Result<Response<Body>, ProxyError> {
        let start = Instant::now();
        let path = request.uri().path().to_string();

        let service = match self.router.resolve(&path) {
            Ok(service) => service,
            Err(e) => {
                metrics::record_request("none", StatusCode::BAD_REQUEST.as_u16(), "none", start);
                return Err(e.into());
            }
        };

        let backend = match service.next_backend() {
            Ok(backend) => backend,
            Err(source) => {
                metrics::record_request(&service.name, StatusCode::SERVICE_UNAVAILABLE.as_u16(), "none", start);
                return Err(ProxyError::NoHealthyBackend {
                    service: service.name.clone(),
                    source,
                });
            }
        };

        let backend_addr = backend.authority();
        tracing::debug!(service = %service.name, backend = %backend_addr, path = %path, "Forwarding request");

        match self.forwarder.forward(&backend, request).await {
            Ok(response) => {
                metrics::record_request(&service.name, response.status().as_u16(), &backend_addr, start);
                Ok(response)
            }
            Err(source) => {
                tracing::error!(service = %service.name, backend = %backend_addr, error = %source, "Upstream error");
                metrics::record_request(&service.name, StatusCode::BAD_GATEWAY.as_u16(), &backend_addr, start);
                Err(ProxyError::Upstream {
                    service: service.name.clone(),
                    backend: backend_addr,
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ReplicaConfig, ServiceConfig};
    use crate::load_balancer::{Backend, StrategyKind};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers with the chosen backend's authority, or fails for listed backends.
    #[derive(Default)]
    struct EchoForwarder {
        failing: Vec<String>,
        seen: Mutex<Vec<String>>,
    }

    impl Forwarder for EchoForwarder {
        async fn forward(&self, backend: &Backend, _request: Request<Body>) -> Result<Response<Body>, ForwardError> {
            let addr = backend.authority();
            self.seen.lock().unwrap().push(addr.clone());
            if self.failing.contains(&addr) {
                return Err(ForwardError::InvalidUri("simulated".into()));
            }
            Ok(Response::builder()
                .status(StatusCode::ACCEPTED)
                .body(Body::from(addr))
                .unwrap())
        }
    }

    fn replica(port: u16, weight: &str) -> ReplicaConfig {
        let mut metadata = HashMap::new();
        metadata.insert("weight".to_string(), weight.to_string());
        ReplicaConfig {
            url: format!("http://127.0.0.1:{}", port),
            metadata,
        }
    }

    fn balancer(forwarder: EchoForwarder) -> LoadBalancer<EchoForwarder> {
        let services = vec![ServiceConfig {
            name: "api".into(),
            matcher: "/api/v1".into(),
            strategy: Some(StrategyKind::WeightedRoundRobin),
            replicas: vec![replica(8081, "1"), replica(8082, "2")],
        }];
        let router = Router::from_config(&services, StrategyKind::RoundRobin).unwrap();
        LoadBalancer::new(Arc::new(router), forwarder)
    }

    fn get(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    async fn body_string(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_weighted_window() {
        let lb = balancer(EchoForwarder::default());
        let mut picks = Vec::new();
        for _ in 0..3 {
            let response = lb.handle(get("/api/v1/ping")).await.unwrap();
            assert_eq!(response.status(), StatusCode::ACCEPTED);
            picks.push(body_string(response).await);
        }
        assert_eq!(picks.iter().filter(|p| *p == "127.0.0.1:8082").count(), 2);
        assert_eq!(picks.iter().filter(|p| *p == "127.0.0.1:8081").count(), 1);
    }

    #[tokio::test]
    async fn test_no_route_is_bad_request() {
        let lb = balancer(EchoForwarder::default());
        let err = lb.handle(get("/unknown")).await.unwrap_err();
        assert!(matches!(err, ProxyError::NoRoute(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(lb.forwarder.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_down_is_unavailable() {
        let lb = balancer(EchoForwarder::default());
        for b in &lb.router().services()[0].backends {
            b.set_liveness(false);
        }
        let err = lb.handle(get("/api/v1/ping")).await.unwrap_err();
        assert!(matches!(err, ProxyError::NoHealthyBackend { source: StrategyError::AllDown, .. }));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_forward_error_is_not_retried() {
        let lb = balancer(EchoForwarder {
            failing: vec!["127.0.0.1:8081".into()],
            ..EchoForwarder::default()
        });
        let err = lb.handle(get("/api/v1/ping")).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        // Exactly one attempt, no failover to 8082
        assert_eq!(*lb.forwarder.seen.lock().unwrap(), vec!["127.0.0.1:8081".to_string()]);
    }

    #[tokio::test]
    async fn test_error_body_hides_detail() {
        let err = ProxyError::NoRoute(RouteError::NoMatch { path: "/secret/internal".into() });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, "Bad Request");
    }
}
