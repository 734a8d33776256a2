//! Backend health state machine.
//!
//! # States
//! - Healthy: backend receives traffic
//! - Unhealthy: backend excluded from load balancing
//!
//! # State Transitions
//! ```text
//! Healthy → Unhealthy: one failed probe
//! Unhealthy → Healthy: one successful probe
//! ```
//!
//! Self-transitions are no-ops and produce no event.

use std::fmt;

use crate::load_balancer::Backend;

/// Health state of a backend, derived from its liveness flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

impl From<bool> for HealthState {
    fn from(alive: bool) -> Self {
        if alive {
            HealthState::Healthy
        } else {
            HealthState::Unhealthy
        }
    }
}

/// An edge of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    BecameHealthy,
    BecameUnhealthy,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::BecameHealthy => "healthy",
            Transition::BecameUnhealthy => "unhealthy",
        }
    }

    /// State the backend is in after this transition.
    pub fn target(&self) -> HealthState {
        match self {
            Transition::BecameHealthy => HealthState::Healthy,
            Transition::BecameUnhealthy => HealthState::Unhealthy,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record a probe result on the backend.
///
/// Returns the transition if the result changed the backend's state.
pub fn apply_probe(backend: &Backend, reachable: bool) -> Option<Transition> {
    let previous = HealthState::from(backend.set_liveness(reachable));
    match (previous, HealthState::from(reachable)) {
        (HealthState::Healthy, HealthState::Unhealthy) => Some(Transition::BecameUnhealthy),
        (HealthState::Unhealthy, HealthState::Healthy) => Some(Transition::BecameHealthy),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::backend::tests::backend;

    #[test]
    fn test_one_event_per_edge() {
        let b = backend(8080, None);
        assert!(b.is_alive());

        // Steady state: no events
        assert_eq!(apply_probe(&b, true), None);
        assert_eq!(apply_probe(&b, true), None);

        assert_eq!(apply_probe(&b, false), Some(Transition::BecameUnhealthy));
        assert!(!b.is_alive());
        assert_eq!(apply_probe(&b, false), None);

        assert_eq!(apply_probe(&b, true), Some(Transition::BecameHealthy));
        assert!(b.is_alive());
        assert_eq!(apply_probe(&b, true), None);
    }

    #[test]
    fn test_transition_target() {
        assert_eq!(Transition::BecameHealthy.target(), HealthState::Healthy);
        assert_eq!(Transition::BecameUnhealthy.target(), HealthState::Unhealthy);
        assert_eq!(Transition::BecameUnhealthy.to_string(), "unhealthy");
    }
}
