//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (check per-IP limits)
//!     → [origin gate decides admission]
//!     → Pass to handlers
//!
//! Outgoing request/response:
//!     → headers.rs (strip hop-by-hop headers, add security headers)
//! ```
//!
//! # Design Decisions
//! - Defense in depth: limits apply even to admitted origins
//! - No trust in client input
//! - Body size bounded before handlers read it

pub mod headers;
pub mod rate_limit;
