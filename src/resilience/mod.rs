//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → On failure: retries.rs (check if retryable, acquire budget)
//!     → backoff.rs (jittered exponential delay between attempts)
//!     → Give up: map to 502 for the caller
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - Retries only for idempotent requests
//! - Jittered backoff prevents thundering herd
//! - Retry budget prevents retry storms under load

pub mod backoff;
pub mod retries;

pub use backoff::calculate_backoff;
pub use retries::{is_retryable, RetryBudget};
