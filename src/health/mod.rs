//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs), one loop per service:
//!     Periodic timer (or shutdown signal)
//!     → Spawn one TCP connect probe per backend
//!     → Update liveness through state.rs
//!
//! State machine (state.rs):
//!     Healthy ←→ Unhealthy
//!     One probe result per transition, edges reported once
//! ```
//!
//! # Design Decisions
//! - Probes are independent tasks; one slow or failing backend never delays another
//! - Every probe is bounded by a connect timeout
//! - Probe failures are absorbed into liveness, never surfaced on the request path
//! - Health state is per-backend, not per-service

pub mod active;
pub mod state;

pub use active::{spawn_monitors, HealthMonitor};
pub use state::{HealthState, Transition};
