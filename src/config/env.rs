//! Environment variable names and lookup.
//!
//! Origin lists and secrets can be supplied through the environment in
//! addition to the config file. The allowlist variable has a
//! platform-generic alias kept for backward compatibility; the first
//! non-empty value wins.

/// Primary allowlist variable (comma-separated origins).
pub const ALLOWED_ORIGINS: &str = "NEXUS_ALLOWED_ORIGINS";

/// Backward-compatible alias for [`ALLOWED_ORIGINS`].
pub const ALLOWED_ORIGINS_ALIAS: &str = "EDGE_ALLOWED_ORIGINS";

/// Additional blocked hosts (comma-separated origins or hostnames).
pub const BLOCKED_ORIGINS: &str = "NEXUS_BLOCKED_ORIGINS";

/// Service key for the directory admin API.
pub const DIRECTORY_SERVICE_KEY: &str = "NEXUS_DIRECTORY_SERVICE_KEY";

/// API key for the assist model provider.
pub const ASSIST_API_KEY: &str = "NEXUS_ASSIST_API_KEY";

fn non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// Allowlist from the environment: primary variable first, then the
/// alias.
pub fn allowed_origins() -> Option<String> {
    non_empty(ALLOWED_ORIGINS).or_else(|| non_empty(ALLOWED_ORIGINS_ALIAS))
}

/// Extra blocked origins from the environment.
pub fn blocked_origins() -> Option<String> {
    non_empty(BLOCKED_ORIGINS)
}

pub fn directory_service_key() -> Option<String> {
    non_empty(DIRECTORY_SERVICE_KEY)
}

pub fn assist_api_key() -> Option<String> {
    non_empty(ASSIST_API_KEY)
}
