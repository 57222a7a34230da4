//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → env.rs (environment overlay: origin lists, secrets)
//!     → validation.rs (semantic checks)
//!     → EdgeConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//!
//! On reload signal (file change or SIGHUP):
//!     watcher.rs detects change
//!     → loader.rs loads new config (env overlay reapplied)
//!     → validation.rs validates
//!     → origin gate snapshot rebuilt; swapped only if its
//!       signature differs from the live one
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Environment origin lists are merged with file lists (union),
//!   matching the denylist/allowlist union semantics
//! - Validation separates syntactic (serde) from semantic checks

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::EdgeConfig;
pub use schema::ListenerConfig;
pub use schema::OriginsConfig;
pub use schema::UpstreamsConfig;
