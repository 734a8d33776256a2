//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, ConfigSource)
//!     → validation.rs (semantic checks)
//!     → BalancerConfig (validated, immutable)
//!     → consumed once at startup to build the router
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Any load or validation failure is fatal at startup

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigError, ConfigSource, FileConfigSource, StaticConfigSource};
pub use schema::BalancerConfig;
pub use schema::HealthCheckConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::ReplicaConfig;
pub use schema::ServiceConfig;
pub use schema::TimeoutConfig;
