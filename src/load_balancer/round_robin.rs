//! Round-robin load balancing strategy.

use std::sync::{Arc, Mutex, PoisonError};

use crate::load_balancer::{backend::Backend, BalancingStrategy, StrategyError, StrategyKind};

/// Round-robin selector.
/// Keeps a cursor to rotate through backends, skipping those not live.
#[derive(Debug, Default)]
pub struct RoundRobin {
    /// Index of the next backend to try.
    cursor: Mutex<usize>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BalancingStrategy for RoundRobin {
    fn next(&self, backends: &[Arc<Backend>]) -> Result<Arc<Backend>, StrategyError> {
        let len = backends.len();
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);

        // At most one full scan before giving up
        for i in 0..len {
            let index = (*cursor + i) % len;
            let backend = &backends[index];
            if backend.is_alive() {
                *cursor = (index + 1) % len;
                return Ok(backend.clone());
            }
        }

        Err(StrategyError::AllDown)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::RoundRobin
    }
}
