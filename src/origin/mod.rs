//! Origin admission subsystem.
//!
//! # Data Flow
//! ```text
//! Configuration (file + environment origin lists)
//!     → host.rs (canonical host extraction)
//!     → blocklist.rs (BlockedHostSet: denied hosts)
//!     → allowlist.rs (AllowedOriginSet: permitted origins,
//!                     filtered through the blocklist)
//!     → gate.rs (OriginGate: admit/deny + CORS header value)
//!     → shared via ArcSwap to the HTTP middleware
//!
//! On reload (file change or SIGHUP):
//!     Sets rebuilt from fresh configuration
//!     → signature compared against the live snapshot
//!     → atomic swap only when the signature changed
//! ```
//!
//! # Design Decisions
//! - Snapshots are immutable once built; decisions are pure functions
//! - Blocklist always wins over allowlist, even for configured entries
//! - Malformed configured entries are skipped, never an error
//! - An empty allowlist means "no restriction configured" (fail-open)

pub mod allowlist;
pub mod blocklist;
pub mod gate;
pub mod host;

pub use allowlist::AllowedOriginSet;
pub use blocklist::BlockedHostSet;
pub use gate::{OriginGate, ANY_ORIGIN};
