//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the balancer.
//! All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;

use serde::Deserialize;

use crate::load_balancer::StrategyKind;

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct BalancerConfig {
    /// Strategy used by services that do not name one.
    pub strategy: StrategyKind,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Services, in declaration order.
    pub services: Vec<ServiceConfig>,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// A logical service: a path prefix and the replicas serving it.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Service identifier for logging/metrics.
    pub name: String,

    /// Path prefix selecting this service.
    pub matcher: String,

    /// Balancing strategy; falls back to the root `strategy` when absent.
    #[serde(default)]
    pub strategy: Option<StrategyKind>,

    /// Replicas, in declaration order.
    #[serde(default)]
    pub replicas: Vec<ReplicaConfig>,
}

/// One backend replica of a service.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplicaConfig {
    /// Base URL (e.g., "http://127.0.0.1:3000").
    pub url: String,

    /// Free-form tags. `weight` is read by weighted round-robin.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable active health checks.
    pub enabled: bool,

    /// Health check interval in seconds.
    pub interval_secs: u64,

    /// Connect timeout of a single probe in seconds.
    pub timeout_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 10,
            timeout_secs: 30,
        }
    }
}

/// Timeout configuration for forwarded requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

impl ServiceConfig {
    /// The strategy this service runs, given the root default.
    pub fn strategy_or(&self, default: StrategyKind) -> StrategyKind {
        self.strategy.unwrap_or(default)
    }
}
