//! Metrics collection and exposition.
//!
//! # Metrics
//! - `balancer_requests_total` (counter): requests by service, status, backend
//! - `balancer_request_duration_seconds` (histogram): latency distribution
//! - `balancer_backend_up` (gauge): 1=live, 0=not live
//! - `balancer_health_transitions_total` (counter): liveness edges by kind
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::health::Transition;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(service: &str, status: u16, backend: &str, start: Instant) {
    counter!(
        "balancer_requests_total",
        "service" => service.to_string(),
        "status" => status.to_string(),
        "backend" => backend.to_string()
    )
    .increment(1);
    histogram!("balancer_request_duration_seconds", "service" => service.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record the current liveness of a backend.
pub fn record_backend_health(service: &str, backend: &str, alive: bool) {
    gauge!(
        "balancer_backend_up",
        "service" => service.to_string(),
        "backend" => backend.to_string()
    )
    .set(if alive { 1.0 } else { 0.0 });
}

/// Record a liveness edge.
pub fn record_health_transition(service: &str, backend: &str, transition: Transition) {
    counter!(
        "balancer_health_transitions_total",
        "service" => service.to_string(),
        "backend" => backend.to_string(),
        "transition" => transition.as_str()
    )
    .increment(1);
}
