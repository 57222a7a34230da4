//! Active health checking for upstream services.
//!
//! # Responsibilities
//! - Periodically probe upstreams that configure a health path
//! - Update upstream health state based on results

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::config::schema::HealthCheckConfig;
use crate::observability::metrics;
use crate::upstream::Upstreams;

pub struct HealthMonitor {
    upstreams: Arc<Upstreams>,
    config: HealthCheckConfig,
    client: reqwest::Client,
}

impl HealthMonitor {
    pub fn new(upstreams: Arc<Upstreams>, config: HealthCheckConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("nexus-edge-health-check")
            .build()
            .unwrap_or_default();

        Self {
            upstreams,
            config,
            client,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Active health checks disabled");
            return;
        }

        tracing::info!(
            interval = self.config.interval_secs,
            "Health monitor starting"
        );

        let interval = Duration::from_secs(self.config.interval_secs);
        let mut ticker = time::interval(interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    async fn check_all(&self) {
        for upstream in self.upstreams.all() {
            let Some(url) = upstream.health_url() else {
                continue;
            };

            let healthy = match self.client.get(url).send().await {
                Ok(response) => {
                    let success = response.status().is_success();
                    if !success {
                        tracing::warn!(
                            upstream = upstream.name,
                            status = %response.status(),
                            "Health check failed: non-success status"
                        );
                    }
                    success
                }
                Err(e) => {
                    tracing::warn!(
                        upstream = upstream.name,
                        error = %e,
                        "Health check failed: connection error"
                    );
                    false
                }
            };

            if healthy {
                upstream.mark_success(self.config.healthy_threshold as usize);
            } else {
                upstream.mark_failure(self.config.unhealthy_threshold as usize);
            }

            metrics::record_upstream_health(upstream.name, upstream.is_healthy());
        }
    }
}
