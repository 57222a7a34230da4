//! Request-path middleware.
//!
//! # Data Flow
//! ```text
//! Incoming request (after rate limiting):
//!     → origin_gate.rs (preflight short-circuit, admit/deny, CORS headers)
//!     → metrics.rs (request accounting around the handler)
//!     → Pass to edge function handlers
//! ```

pub mod metrics;
pub mod origin_gate;

pub use origin_gate::{origin_gate_middleware, GateState};
