//! Path-prefix HTTP load balancer library.
//!
//! Requests are matched to a service by URL path prefix, a per-service
//! balancing strategy picks a live backend, and the request is forwarded to
//! it. A health monitor per service keeps backend liveness current.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod routing;

pub use config::BalancerConfig;
pub use http::{HttpServer, LoadBalancer};
pub use lifecycle::Shutdown;
