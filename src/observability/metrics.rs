//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_requests_total` (counter): requests by route, method, status
//! - `edge_request_duration_seconds` (histogram): latency distribution
//! - `edge_origin_rejected_total` (counter): gate rejections
//! - `edge_rate_limited_total` (counter): rate limiter rejections
//! - `edge_relay_retries_total` (counter): relay retry attempts
//! - `edge_upstream_healthy` (gauge): 1=healthy, 0=unhealthy
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Labels for route, method, status code, upstream name
//! - Exporter runs on its own listener, never on the public bind

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("route", route.to_string()),
    ];
    counter!("edge_requests_total", &labels).increment(1);
    histogram!("edge_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

/// Record a request denied by the origin gate.
pub fn record_origin_rejected() {
    counter!("edge_origin_rejected_total").increment(1);
}

/// Record a request denied by the rate limiter.
pub fn record_rate_limited(scope: &'static str) {
    counter!("edge_rate_limited_total", "scope" => scope).increment(1);
}

/// Record a relay retry attempt.
pub fn record_relay_retry() {
    counter!("edge_relay_retries_total").increment(1);
}

/// Record upstream health as observed by the monitor.
pub fn record_upstream_health(upstream: &str, healthy: bool) {
    gauge!("edge_upstream_healthy", "upstream" => upstream.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
