//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace and timeout layers)
//!     → balancer.rs (route lookup, strategy pick, error mapping)
//!     → forward.rs (hyper client hop to the chosen backend)
//!     → backend response sent to client unchanged
//! ```

pub mod balancer;
pub mod forward;
pub mod request;
pub mod server;

pub use balancer::{LoadBalancer, ProxyError};
pub use forward::{ForwardError, Forwarder, HttpForwarder};
pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::HttpServer;
