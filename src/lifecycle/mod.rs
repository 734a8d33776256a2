//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → latched watch flag → server stops accepting, monitors exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup lives in main: logging, config, router, listener
//! - One watch channel reaches every long-running task, including late subscribers

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
