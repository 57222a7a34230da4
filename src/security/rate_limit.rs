//! Per-client rate limiting middleware.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;

use crate::config::schema::RateLimitConfig;
use crate::http::response::reject;
use crate::observability::metrics;

/// A simple token bucket rate limiter.
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        // Refill tokens
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Shared state for the per-IP rate limiter.
pub struct RateLimiterState {
    buckets: DashMap<IpAddr, TokenBucket>,
    refill_rate: f64,
    burst: f64,
}

impl RateLimiterState {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            buckets: DashMap::new(),
            refill_rate: config.requests_per_second as f64,
            burst: config.burst_size as f64,
        }
    }

    fn check(&self, ip: IpAddr) -> bool {
        let mut bucket = self
            .buckets
            .entry(ip)
            .or_insert_with(|| TokenBucket::new(self.burst));
        bucket.try_acquire(self.burst, self.refill_rate)
    }
}

/// Middleware function for per-IP rate limiting.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = addr.ip();
    if state.check(ip) {
        next.run(request).await
    } else {
        tracing::warn!(client = %ip, "Rate limit exceeded");
        metrics::record_rate_limited("per_ip");
        reject(StatusCode::TOO_MANY_REQUESTS, "rate_limited")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_is_exhausted_without_refill() {
        let state = RateLimiterState::new(&RateLimitConfig {
            enabled: true,
            requests_per_second: 1,
            burst_size: 2,
        });
        let ip: IpAddr = "10.0.0.1".parse().unwrap();

        assert!(state.check(ip));
        assert!(state.check(ip));
        assert!(!state.check(ip));
    }

    #[test]
    fn test_clients_have_independent_buckets() {
        let state = RateLimiterState::new(&RateLimitConfig {
            enabled: true,
            requests_per_second: 1,
            burst_size: 1,
        });
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(state.check(a));
        assert!(!state.check(a));
        assert!(state.check(b));
    }
}
