//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, layer stack)
//!     → request.rs (request ID make/propagate)
//!     → middleware/ (rate limit, origin gate, request accounting)
//!     → signup.rs | users.rs | assist.rs | relay.rs (edge functions)
//!     → response.rs (structured rejection bodies)
//!     → Send to client
//! ```

pub mod assist;
pub mod middleware;
pub mod relay;
pub mod request;
pub mod response;
pub mod server;
pub mod signup;
pub mod tls;
pub mod users;

pub use request::{request_id, MakeEdgeRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
