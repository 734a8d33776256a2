//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe each backend of a service
//! - Update backend liveness based on results
//! - Report only state edges

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::health::state::{apply_probe, Transition};
use crate::lifecycle::{Shutdown, ShutdownSignal};
use crate::load_balancer::Backend;
use crate::observability::metrics;
use crate::routing::{Router, Service};

/// Floor for the tick interval and probe timeout. `time::interval` panics on zero.
const MIN_TIMING: Duration = Duration::from_millis(10);

/// Health check loop for the backends of one service.
pub struct HealthMonitor {
    service: Arc<Service>,
    interval: Duration,
    timeout: Duration,
}

impl HealthMonitor {
    pub fn new(service: Arc<Service>, config: &HealthCheckConfig) -> Self {
        Self {
            service,
            interval: MIN_TIMING,
            timeout: MIN_TIMING,
        }
        .with_timing(
            Duration::from_secs(config.interval_secs),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Override the tick interval and probe timeout. Values below 10ms are raised to it.
    pub fn with_timing(mut self, interval: Duration, timeout: Duration) -> Self {
        if interval < MIN_TIMING || timeout < MIN_TIMING {
            tracing::warn!(
                service = %self.service.name,
                interval = ?interval,
                timeout = ?timeout,
                minimum = ?MIN_TIMING,
                "Health check timing below minimum, clamping"
            );
        }
        self.interval = interval.max(MIN_TIMING);
        self.timeout = timeout.max(MIN_TIMING);
        self
    }

    /// Probe every `interval` until the shutdown signal fires.
    ///
    /// The first round of probes runs immediately.
    /// At most one probe per backend is in flight; outstanding probes are
    /// aborted on shutdown.
    pub async fn run(self, mut shutdown: ShutdownSignal) {
        tracing::info!(
            service = %self.service.name,
            interval = ?self.interval,
            timeout = ?self.timeout,
            backends = self.service.backends.len(),
            "Health monitor starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut probes: Vec<Option<JoinHandle<()>>> = self.service.backends.iter().map(|_| None).collect();

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!(service = %self.service.name, "Health monitor received shutdown signal, exiting loop");
                    break;
                }
                _ = ticker.tick() => {
                    self.check_all(&mut probes);
                }
            }
        }

        for handle in probes.into_iter().flatten() {
            handle.abort();
        }
    }

    /// Fan out one independent probe task per backend, skipping backends
    /// whose previous probe has not finished. Returns the number launched.
    fn check_all(&self, probes: &mut [Option<JoinHandle<()>>]) -> usize {
        let mut launched = 0;
        for (backend, slot) in self.service.backends.iter().zip(probes.iter_mut()) {
            if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
                tracing::debug!(service = %self.service.name, backend = %backend, "Previous probe still running, skipping");
                continue;
            }

            let service = self.service.clone();
            let backend = backend.clone();
            let timeout = self.timeout;
            *slot = Some(tokio::spawn(async move {
                check_backend(&service.name, &backend, timeout).await;
            }));
            launched += 1;
        }
        launched
    }
}

/// Attempt a TCP connection to `authority` within `timeout`.
pub async fn probe(authority: &str, timeout: Duration) -> bool {
    match time::timeout(timeout, TcpStream::connect(authority)).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            tracing::trace!(addr = %authority, error = %e, "Probe failed: connection error");
            false
        }
        Err(_) => {
            tracing::trace!(addr = %authority, "Probe failed: timeout");
            false
        }
    }
}

/// Probe one backend and apply the result to its liveness.
pub async fn check_backend(service: &str, backend: &Backend, timeout: Duration) -> Option<Transition> {
    let reachable = probe(&backend.authority(), timeout).await;
    let transition = apply_probe(backend, reachable);

    match transition {
        Some(Transition::BecameUnhealthy) => {
            tracing::warn!(service = %service, backend = %backend, transition = %Transition::BecameUnhealthy, "Backend transitioned from healthy to unhealthy");
        }
        Some(Transition::BecameHealthy) => {
            tracing::info!(service = %service, backend = %backend, transition = %Transition::BecameHealthy, "Backend transitioned from unhealthy to healthy");
        }
        None => {}
    }

    if let Some(t) = transition {
        metrics::record_health_transition(service, &backend.authority(), t);
    }
    metrics::record_backend_health(service, &backend.authority(), backend.is_alive());

    transition
}

/// Start one health monitor per service.
pub fn spawn_monitors(router: &Router, config: &HealthCheckConfig, shutdown: &Shutdown) -> Vec<JoinHandle<()>> {
    if !config.enabled {
        tracing::info!("Active health checks disabled");
        return Vec::new();
    }

    router
        .services()
        .iter()
        .map(|service| {
            let monitor = HealthMonitor::new(service.clone(), config);
            tokio::spawn(monitor.run(shutdown.subscribe()))
        })
        .collect()
}
