//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (route lookup)
//!     → matcher.rs (evaluate path prefix)
//!     → Return: matched Service or NoMatch
//!
//! Route Compilation (at startup):
//!     ServiceConfig[]
//!     → service.rs (backends + fresh strategy instance per service)
//!     → Sort by matcher specificity
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Services compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same service
//! - Longest prefix wins, declaration order breaks ties

pub mod matcher;
pub mod router;
pub mod service;

pub use router::{RouteError, Router};
pub use service::Service;
