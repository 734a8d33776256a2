//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend replica of a service
//! - Expose metadata tags (e.g. `weight`) with typed defaults
//! - Track liveness (written by the health monitor, read everywhere else)

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use url::Url;

/// Metadata key holding the weighted round-robin weight.
pub const WEIGHT_KEY: &str = "weight";

/// A single backend replica.
#[derive(Debug)]
pub struct Backend {
    /// Base URL requests are forwarded to.
    pub url: Url,
    /// Free-form tags from the replica configuration.
    pub metadata: HashMap<String, String>,
    /// Believed reachability. Only the health monitor writes it.
    alive: AtomicBool,
}

impl Backend {
    /// Create a new backend. Backends start out live until a probe says otherwise.
    pub fn new(url: Url, metadata: HashMap<String, String>) -> Self {
        Self {
            url,
            metadata,
            alive: AtomicBool::new(true),
        }
    }

    /// `host:port` of the backend, using the scheme's default port when none is given.
    pub fn authority(&self) -> String {
        let host = self.url.host_str().unwrap_or_default();
        match self.url.port_or_known_default() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    /// Return the metadata value for `key`, or `default` when absent.
    pub fn meta_or_default<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.metadata.get(key).map(String::as_str).unwrap_or(default)
    }

    /// Return the metadata value for `key` parsed as an integer.
    /// Missing or unparsable values yield `default`.
    pub fn meta_or_default_int(&self, key: &str, default: u32) -> u32 {
        self.metadata
            .get(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Requests granted per weighted round (defaults to 1).
    ///
    /// A zero weight is treated like an unparsable one, so a live backend is always eligible.
    pub fn weight(&self) -> u32 {
        Some(self.meta_or_default_int(WEIGHT_KEY, 1))
            .filter(|w| *w > 0)
            .unwrap_or(1)
    }

    /// Set liveness and return the previous value.
    pub fn set_liveness(&self, alive: bool) -> bool {
        self.alive.swap(alive, Ordering::AcqRel)
    }

    /// Report the current liveness.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.authority())
    }
}
