//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject duplicate service names and matchers
//! - Validate replica URLs and `weight` tags
//! - Validate value ranges (intervals > 0, bind address parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::BalancerConfig;
use crate::load_balancer::backend::WEIGHT_KEY;

/// A single semantic problem found in the configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no services configured")]
    NoServices,

    #[error("service #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("service name '{0}' is declared more than once")]
    DuplicateName(String),

    #[error("service '{service}': matcher '{matcher}' must start with '/'")]
    InvalidMatcher { service: String, matcher: String },

    #[error("service '{service}': matcher '{matcher}' is already used by another service")]
    DuplicateMatcher { service: String, matcher: String },

    #[error("service '{0}' has no replicas")]
    NoReplicas(String),

    #[error("service '{service}': invalid replica url '{url}': {reason}")]
    InvalidReplicaUrl { service: String, url: String, reason: String },

    #[error("service '{service}': replica '{url}' has invalid weight '{weight}' (expected a positive integer)")]
    InvalidWeight { service: String, url: String, weight: String },

    #[error("health_check.{0} must be greater than zero")]
    ZeroHealthCheckSetting(&'static str),

    #[error("invalid listener bind address '{0}'")]
    InvalidBindAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.services.is_empty() {
        errors.push(ValidationError::NoServices);
    }

    let mut names = HashSet::new();
    let mut matchers = HashSet::new();

    for (index, service) in config.services.iter().enumerate() {
        if service.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName { index });
        } else if !names.insert(service.name.as_str()) {
            errors.push(ValidationError::DuplicateName(service.name.clone()));
        }

        if !service.matcher.starts_with('/') {
            errors.push(ValidationError::InvalidMatcher {
                service: service.name.clone(),
                matcher: service.matcher.clone(),
            });
        } else if !matchers.insert(service.matcher.as_str()) {
            errors.push(ValidationError::DuplicateMatcher {
                service: service.name.clone(),
                matcher: service.matcher.clone(),
            });
        }

        if service.replicas.is_empty() {
            errors.push(ValidationError::NoReplicas(service.name.clone()));
        }

        for replica in &service.replicas {
            if let Err(reason) = check_replica_url(&replica.url) {
                errors.push(ValidationError::InvalidReplicaUrl {
                    service: service.name.clone(),
                    url: replica.url.clone(),
                    reason,
                });
            }

            if let Some(weight) = replica.metadata.get(WEIGHT_KEY) {
                if !matches!(weight.trim().parse::<u32>(), Ok(w) if w > 0) {
                    errors.push(ValidationError::InvalidWeight {
                        service: service.name.clone(),
                        url: replica.url.clone(),
                        weight: weight.clone(),
                    });
                }
            }
        }
    }

    if config.health_check.interval_secs == 0 {
        errors.push(ValidationError::ZeroHealthCheckSetting("interval_secs"));
    }
    if config.health_check.timeout_secs == 0 {
        errors.push(ValidationError::ZeroHealthCheckSetting("timeout_secs"));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.listener.bind_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_replica_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if url.scheme() != "http" {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ReplicaConfig, ServiceConfig};
    use std::collections::HashMap;

    fn service(name: &str, matcher: &str, urls: &[&str]) -> ServiceConfig {
        ServiceConfig {
            name: name.to_string(),
            matcher: matcher.to_string(),
            strategy: None,
            replicas: urls
                .iter()
                .map(|u| ReplicaConfig {
                    url: u.to_string(),
                    metadata: HashMap::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_valid_config() {
        let mut config = BalancerConfig::default();
        config.services.push(service("api", "/api", &["http://localhost:8081"]));
        config.services.push(service("api-v1", "/api/v1", &["http://localhost:8082"]));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_config_rejected() {
        let errors = validate_config(&BalancerConfig::default()).unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoServices]);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = BalancerConfig::default();
        config.services.push(service("api", "api", &["localhost:8081"]));
        config.services.push(service("api", "/web", &[]));
        config.services.push(service("other", "/web", &["https://secure.example.com"]));
        config.health_check.timeout_secs = 0;
        config.listener.bind_address = "not-an-address".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::InvalidMatcher {
            service: "api".into(),
            matcher: "api".into()
        }));
        assert!(errors.contains(&ValidationError::DuplicateName("api".into())));
        assert!(errors.contains(&ValidationError::NoReplicas("api".into())));
        assert!(errors.contains(&ValidationError::DuplicateMatcher {
            service: "other".into(),
            matcher: "/web".into()
        }));
        assert!(errors.contains(&ValidationError::ZeroHealthCheckSetting("timeout_secs")));
        assert!(errors.contains(&ValidationError::InvalidBindAddress("not-an-address".into())));
        let bad_urls = errors
            .iter()
            .filter(|e| matches!(e, ValidationError::InvalidReplicaUrl { .. }))
            .count();
        assert_eq!(bad_urls, 2);
    }

    #[test]
    fn test_weight_must_be_positive_integer() {
        for (weight, ok) in [("1", true), ("10", true), ("0", false), ("-2", false), ("fast", false)] {
            let mut svc = service("api", "/api", &["http://localhost:8081"]);
            svc.replicas[0].metadata.insert(WEIGHT_KEY.to_string(), weight.to_string());
            let mut config = BalancerConfig::default();
            config.services.push(svc);
            assert_eq!(validate_config(&config).is_ok(), ok, "weight {}", weight);
        }
    }
}
