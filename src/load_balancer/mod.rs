//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Service resolved by the router
//!     → strategy instance owned by that service
//!     → Apply load balancing algorithm:
//!         - round_robin.rs (rotate through live backends)
//!         - weighted.rs (rotate, granting `weight` requests per backend per round)
//!     → backend.rs (liveness read, address handed to the forwarder)
//!     → Return backend or AllDown
//! ```
//!
//! # Design Decisions
//! - One independent strategy instance per service (no shared registry)
//! - Strategy names are resolved once, at construction, into `StrategyKind`
//! - Unknown names degrade to round-robin with a warning
//! - Non-live backends are skipped; no live backend fails closed

pub mod backend;
pub mod round_robin;
pub mod weighted;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub use backend::Backend;
pub use round_robin::RoundRobin;
pub use weighted::WeightedRoundRobin;

/// Errors returned by a balancing strategy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StrategyError {
    /// Every backend of the service is currently not live.
    #[error("all backends are down")]
    AllDown,
}

/// A stateful policy selecting the next backend of a service.
///
/// Implementations must be safe to call concurrently; each call is
/// linearised against the instance's own state.
pub trait BalancingStrategy: Send + Sync + fmt::Debug {
    /// Select the next backend from `backends`.
    fn next(&self, backends: &[Arc<Backend>]) -> Result<Arc<Backend>, StrategyError>;

    /// The kind of this strategy.
    fn kind(&self) -> StrategyKind;
}

/// Closed set of supported strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    #[default]
    RoundRobin,
    WeightedRoundRobin,
}

impl StrategyKind {
    /// Resolve a configured strategy name.
    ///
    /// Unknown names fall back to `RoundRobin`; this is logged, not an error.
    pub fn from_name(name: &str) -> Self {
        match name {
            "RoundRobin" => StrategyKind::RoundRobin,
            "WeightedRoundRobin" => StrategyKind::WeightedRoundRobin,
            other => {
                tracing::warn!(strategy = %other, "Unknown strategy, defaulting to RoundRobin");
                StrategyKind::RoundRobin
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::RoundRobin => "RoundRobin",
            StrategyKind::WeightedRoundRobin => "WeightedRoundRobin",
        }
    }

    /// Build a fresh, independent strategy instance of this kind.
    pub fn build(self) -> Box<dyn BalancingStrategy> {
        match self {
            StrategyKind::RoundRobin => Box::new(RoundRobin::new()),
            StrategyKind::WeightedRoundRobin => Box::new(WeightedRoundRobin::new()),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StrategyKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(StrategyKind::from_name(&name))
    }
}

/// Resolve a strategy by name and build a new instance of it.
pub fn load_strategy(name: &str) -> Box<dyn BalancingStrategy> {
    let kind = StrategyKind::from_name(name);
    tracing::debug!(strategy = %kind, "Strategy loaded");
    kind.build()
}
