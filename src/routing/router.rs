//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store the services built from configuration
//! - Look up the service whose matcher prefixes the request path
//! - Return matched service or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Longest prefix wins; ties keep declaration order
//! - O(n) path prefix scan (acceptable for typical service counts)
//! - Explicit NoMatch rather than silent default

use std::sync::Arc;

use thiserror::Error;

use crate::config::{ConfigError, ServiceConfig};
use crate::load_balancer::StrategyKind;
use crate::routing::service::Service;

/// Errors returned by route lookup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("no service matches path '{path}'")]
    NoMatch { path: String },
}

/// The routing table.
#[derive(Debug, Default)]
pub struct Router {
    /// Sorted by matcher specificity, most specific first.
    services: Vec<Arc<Service>>,
}

impl Router {
    /// Build the routing table from already constructed services.
    pub fn new(mut services: Vec<Service>) -> Self {
        // Stable sort keeps declaration order between equally specific matchers
        services.sort_by(|a, b| b.matcher.specificity().cmp(&a.matcher.specificity()));
        Self {
            services: services.into_iter().map(Arc::new).collect(),
        }
    }

    /// Build the routing table from configuration.
    pub fn from_config(configs: &[ServiceConfig], default_strategy: StrategyKind) -> Result<Self, ConfigError> {
        let services = configs
            .iter()
            .map(|c| Service::from_config(c, default_strategy))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(services))
    }

    /// Find the service for `path`.
    pub fn resolve(&self, path: &str) -> Result<Arc<Service>, RouteError> {
        match self.services.iter().find(|s| s.matcher.matches(path)) {
            Some(service) => {
                tracing::debug!(
                    service = %service.name,
                    matcher = %service.matcher.prefix(),
                    path = %path,
                    "Route matched"
                );
                Ok(service.clone())
            }
            None => {
                tracing::warn!(path = %path, "No route matched");
                Err(RouteError::NoMatch { path: path.to_string() })
            }
        }
    }

    /// All services, most specific matcher first.
    pub fn services(&self) -> &[Arc<Service>] {
        &self.services
    }
}
