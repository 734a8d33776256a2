//! Weighted round-robin load balancing strategy.
//!
//! Each backend carries an integer `weight` tag: the number of requests it is
//! granted per round before the cursor moves on. Plain round-robin is the
//! special case where every weight is 1.
//!
//! The strategy assumes the backend slice passed to `next` keeps the same
//! identity and order across calls. A slice of a different length is treated
//! as a new backend set: a warning is logged and the accounting restarts.

use std::sync::{Arc, Mutex, PoisonError};

use crate::load_balancer::{backend::Backend, BalancingStrategy, StrategyError, StrategyKind};

#[derive(Debug, Default)]
struct WeightedState {
    /// Requests issued to backend `i` in the current round.
    issued: Vec<u32>,
    /// Backend currently being granted requests.
    cursor: usize,
}

/// Weighted round-robin selector.
#[derive(Debug, Default)]
pub struct WeightedRoundRobin {
    state: Mutex<WeightedState>,
}

impl WeightedRoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BalancingStrategy for WeightedRoundRobin {
    fn next(&self, backends: &[Arc<Backend>]) -> Result<Arc<Backend>, StrategyError> {
        let len = backends.len();
        if len == 0 {
            return Err(StrategyError::AllDown);
        }

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.issued.len() != len {
            if !state.issued.is_empty() {
                tracing::warn!(
                    previous = state.issued.len(),
                    current = len,
                    "Backend set changed under weighted round-robin, resetting accounting"
                );
            }
            state.issued = vec![0; len];
            state.cursor = 0;
        }

        // N + 1 visits: the cursor backend may have exhausted its round and
        // must get a second look once its count is reset.
        for _ in 0..=len {
            let current = state.cursor;
            let backend = &backends[current];
            if state.issued[current] < backend.weight() && backend.is_alive() {
                state.issued[current] += 1;
                return Ok(backend.clone());
            }

            state.issued[current] = 0;
            state.cursor = (current + 1) % len;
        }

        Err(StrategyError::AllDown)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::WeightedRoundRobin
    }
}
