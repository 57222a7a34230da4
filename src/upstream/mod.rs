//! Upstream services subsystem.
//!
//! # Data Flow
//! ```text
//! Edge function handlers
//!     → directory.rs (privileged tenant/user mutations)
//!     → provider.rs (chat completions for the assist function)
//!     → relay handler uses the shared HTTP client directly
//!
//! Health tracking:
//!     Active probes (health.rs) and live relay traffic both feed the
//!     per-upstream hysteresis state machine below.
//!
//!     Healthy → Unhealthy: consecutive failures >= unhealthy_threshold
//!     Unhealthy → Healthy: consecutive successes >= healthy_threshold
//! ```
//!
//! # Design Decisions
//! - One handle per remote service; no load-balanced groups
//! - Hysteresis prevents flapping; Unknown counts as healthy
//! - Health state is advisory (surfaced on /healthz and /admin),
//!   traffic is never short-circuited on it

pub mod directory;
pub mod error;
pub mod health;
pub mod provider;

pub use error::UpstreamError;

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use url::Url;

use crate::config::schema::UpstreamsConfig;

/// Health state enum.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Unknown = 0,
    Healthy = 1,
    Unhealthy = 2,
}

impl From<u8> for HealthState {
    fn from(val: u8) -> Self {
        match val {
            1 => HealthState::Healthy,
            2 => HealthState::Unhealthy,
            _ => HealthState::Unknown,
        }
    }
}

/// A single upstream service handle.
#[derive(Debug)]
pub struct Upstream {
    /// Stable name used in logs, metrics, and the admin API.
    pub name: &'static str,
    /// Base URL; `None` when the upstream is not configured.
    base_url: Option<Url>,
    /// Path probed by the active health monitor, if any.
    health_path: Option<String>,

    /// Current health state (0=Unknown, 1=Healthy, 2=Unhealthy).
    state: AtomicU8,
    /// Consecutive failure count.
    consecutive_failures: AtomicUsize,
    /// Consecutive success count.
    consecutive_successes: AtomicUsize,
}

impl Upstream {
    /// Create an upstream handle. An empty or unparseable base URL
    /// leaves the upstream unconfigured (its functions return 503).
    pub fn new(name: &'static str, base_url: &str, health_path: Option<String>) -> Self {
        let base_url = if base_url.is_empty() {
            None
        } else {
            match Url::parse(base_url) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!(upstream = name, error = %e, "Invalid upstream base URL");
                    None
                }
            }
        };

        Self {
            name,
            base_url,
            health_path,
            state: AtomicU8::new(HealthState::Unknown as u8),
            consecutive_failures: AtomicUsize::new(0),
            consecutive_successes: AtomicUsize::new(0),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Full URL probed by the health monitor, when configured.
    pub fn health_url(&self) -> Option<Url> {
        let base = self.base_url.as_ref()?;
        let path = self.health_path.as_deref()?;
        base.join(path).ok()
    }

    pub fn state(&self) -> HealthState {
        self.state.load(Ordering::Relaxed).into()
    }

    /// Return true if the upstream is considered healthy (Healthy or
    /// Unknown).
    pub fn is_healthy(&self) -> bool {
        self.state.load(Ordering::Relaxed) != (HealthState::Unhealthy as u8)
    }

    /// Report a successful request/check.
    pub fn mark_success(&self, healthy_threshold: usize) {
        self.consecutive_failures.store(0, Ordering::Relaxed);

        let current_state = self.state.load(Ordering::Relaxed);
        if current_state == (HealthState::Healthy as u8) {
            return;
        }

        let successes = self.consecutive_successes.fetch_add(1, Ordering::Relaxed) + 1;
        if successes >= healthy_threshold {
            self.state.store(HealthState::Healthy as u8, Ordering::Relaxed);
            tracing::info!(upstream = self.name, "Upstream marked healthy");
        }
    }

    /// Report a failed request/check.
    pub fn mark_failure(&self, unhealthy_threshold: usize) {
        self.consecutive_successes.store(0, Ordering::Relaxed);

        let current_state = self.state.load(Ordering::Relaxed);
        if current_state == (HealthState::Unhealthy as u8) {
            return;
        }

        let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= unhealthy_threshold {
            self.state.store(HealthState::Unhealthy as u8, Ordering::Relaxed);
            tracing::warn!(upstream = self.name, "Upstream marked unhealthy");
        }
    }
}

/// The fixed set of upstreams this gateway fronts.
#[derive(Debug)]
pub struct Upstreams {
    pub directory: Arc<Upstream>,
    pub assist: Arc<Upstream>,
    pub relay: Arc<Upstream>,
}

impl Upstreams {
    pub fn from_config(config: &UpstreamsConfig) -> Self {
        let relay_base = if config.relay.enabled {
            config.relay.base_url.as_str()
        } else {
            ""
        };

        Self {
            directory: Arc::new(Upstream::new(
                "directory",
                &config.directory.base_url,
                config.directory.health_path.clone(),
            )),
            assist: Arc::new(Upstream::new(
                "assist",
                &config.assist.base_url,
                config.assist.health_path.clone(),
            )),
            relay: Arc::new(Upstream::new(
                "relay",
                relay_base,
                config.relay.health_path.clone(),
            )),
        }
    }

    /// All handles, for health checking and diagnostics.
    pub fn all(&self) -> Vec<Arc<Upstream>> {
        vec![
            self.directory.clone(),
            self.assist.clone(),
            self.relay.clone(),
        ]
    }
}
