//! A routable service: its matcher, replicas and balancing strategy.

use std::collections::HashMap;
use std::sync::Arc;

use url::Url;

use crate::config::{ConfigError, ServiceConfig};
use crate::load_balancer::{Backend, BalancingStrategy, StrategyError, StrategyKind};
use crate::routing::matcher::PathPrefixMatcher;

/// A service bundle, immutable after construction.
#[derive(Debug)]
pub struct Service {
    pub name: String,
    pub matcher: PathPrefixMatcher,
    /// Replicas in declaration order. The strategy relies on this order being stable.
    pub backends: Vec<Arc<Backend>>,
    strategy: Box<dyn BalancingStrategy>,
}

impl Service {
    pub fn new(
        name: impl Into<String>,
        matcher: PathPrefixMatcher,
        backends: Vec<Arc<Backend>>,
        strategy: Box<dyn BalancingStrategy>,
    ) -> Self {
        Self {
            name: name.into(),
            matcher,
            backends,
            strategy,
        }
    }

    /// Build a service from its configuration with a fresh strategy instance.
    pub fn from_config(config: &ServiceConfig, default_strategy: StrategyKind) -> Result<Self, ConfigError> {
        let backends = config
            .replicas
            .iter()
            .map(|replica| {
                let url = Url::parse(&replica.url).map_err(|e| {
                    ConfigError::Invalid(format!("service '{}': replica url '{}': {}", config.name, replica.url, e))
                })?;
                Ok(Arc::new(Backend::new(url, replica.metadata.clone())))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let kind = config.strategy_or(default_strategy);
        tracing::info!(
            service = %config.name,
            matcher = %config.matcher,
            strategy = %kind,
            backends = backends.len(),
            "Service configured"
        );

        Ok(Self::new(
            config.name.clone(),
            PathPrefixMatcher::new(config.matcher.clone()),
            backends,
            kind.build(),
        ))
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    /// Ask the strategy for the next backend and record the decision.
    pub fn next_backend(&self) -> Result<Arc<Backend>, StrategyError> {
        match self.strategy.next(&self.backends) {
            Ok(backend) => {
                tracing::debug!(
                    service = %self.name,
                    backend = %backend,
                    strategy = %self.strategy.kind(),
                    "Strategy picked backend"
                );
                Ok(backend)
            }
            Err(e) => {
                tracing::warn!(
                    service = %self.name,
                    strategy = %self.strategy.kind(),
                    backend_count = self.backends.len(),
                    "All backends are down"
                );
                Err(e)
            }
        }
    }

    /// Liveness of every backend, for diagnostics.
    pub fn backend_states(&self) -> HashMap<String, bool> {
        self.backends
            .iter()
            .map(|b| (b.authority(), b.is_alive()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReplicaConfig;

    fn config(strategy: Option<StrategyKind>) -> ServiceConfig {
        ServiceConfig {
            name: "api".into(),
            matcher: "/api".into(),
            strategy,
            replicas: vec![
                ReplicaConfig {
                    url: "http://127.0.0.1:8081".into(),
                    metadata: HashMap::new(),
                },
                ReplicaConfig {
                    url: "http://127.0.0.1:8082".into(),
                    metadata: HashMap::new(),
                },
            ],
        }
    }

    #[test]
    fn test_from_config() {
        let service = Service::from_config(&config(None), StrategyKind::WeightedRoundRobin).unwrap();
        assert_eq!(service.name, "api");
        assert_eq!(service.backends.len(), 2);
        assert_eq!(service.strategy_kind(), StrategyKind::WeightedRoundRobin);

        let service = Service::from_config(&config(Some(StrategyKind::RoundRobin)), StrategyKind::WeightedRoundRobin).unwrap();
        assert_eq!(service.strategy_kind(), StrategyKind::RoundRobin);
    }

    #[test]
    fn test_invalid_url() {
        let mut cfg = config(None);
        cfg.replicas[0].url = "http://".into();
        let err = Service::from_config(&cfg, StrategyKind::RoundRobin).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_next_backend() {
        let service = Service::from_config(&config(None), StrategyKind::RoundRobin).unwrap();
        assert_eq!(service.next_backend().unwrap().authority(), "127.0.0.1:8081");
        assert_eq!(service.next_backend().unwrap().authority(), "127.0.0.1:8082");

        for b in &service.backends {
            b.set_liveness(false);
        }
        assert_eq!(service.next_backend().unwrap_err(), StrategyError::AllDown);
        assert!(service.backend_states().values().all(|alive| !alive));
    }
}
