//! Nexus Edge: origin-gated edge function gateway.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod origin;
pub mod resilience;
pub mod security;
pub mod upstream;

pub use config::EdgeConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use origin::OriginGate;
