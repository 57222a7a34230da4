//! Retry classification and budget.
//!
//! # Responsibilities
//! - Determine if a failed attempt is retryable (idempotent methods only)
//! - Enforce a retry budget (fraction of live traffic per window)
//!
//! # Design Decisions
//! - Never retry POST/PUT/PATCH (non-idempotent)
//! - Transport errors are always retryable; of the status codes only
//!   502/503/504 are
//! - A small per-window floor keeps retries possible under low traffic

use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::http::{Method, StatusCode};

/// Whether a failed attempt may be retried at all.
pub fn is_retryable(method: &Method, status: Option<StatusCode>, transport_error: bool) -> bool {
    if !method.is_idempotent() {
        return false;
    }
    if transport_error {
        return true;
    }
    matches!(
        status,
        Some(StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT)
    )
}

const BUDGET_WINDOW: Duration = Duration::from_secs(10);

struct WindowState {
    started: Instant,
    requests: usize,
    retries: usize,
}

/// A windowed retry budget.
///
/// At most `ratio` of the live requests observed in the current window
/// may be retries, with a floor of `min_per_window` so that retries
/// remain possible when traffic is low.
pub struct RetryBudget {
    ratio: f32,
    min_per_window: usize,
    state: Mutex<WindowState>,
}

impl RetryBudget {
    pub fn new(ratio: f32, min_per_window: usize) -> Self {
        Self {
            ratio,
            min_per_window,
            state: Mutex::new(WindowState {
                started: Instant::now(),
                requests: 0,
                retries: 0,
            }),
        }
    }

    fn roll_window(state: &mut WindowState) {
        if state.started.elapsed() >= BUDGET_WINDOW {
            state.started = Instant::now();
            state.requests = 0;
            state.retries = 0;
        }
    }

    /// Count one live (non-retry) request against the current window.
    pub fn record_request(&self) {
        let mut state = self.state.lock().expect("retry budget mutex poisoned");
        Self::roll_window(&mut state);
        state.requests += 1;
    }

    /// Try to take a retry token from the current window.
    ///
    /// Consumes the token on success, so callers must only invoke this
    /// when they will actually retry.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock().expect("retry budget mutex poisoned");
        Self::roll_window(&mut state);

        let allowed = ((state.requests as f32) * self.ratio) as usize;
        let allowed = allowed.max(self.min_per_window);
        if state.retries < allowed {
            state.retries += 1;
            true
        } else {
            false
        }
    }
}
