//! Upstream error taxonomy.

use thiserror::Error;

/// Errors that can occur when talking to an upstream service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The upstream has no base URL (or key) configured.
    #[error("{upstream} is not configured")]
    NotConfigured { upstream: &'static str },

    /// The request never produced a response (connect failure, timeout,
    /// protocol error).
    #[error("request to {upstream} failed: {message}")]
    Transport {
        upstream: &'static str,
        message: String,
    },

    /// The upstream answered with a non-success status.
    #[error("{upstream} returned status {status}")]
    Status { upstream: &'static str, status: u16 },

    /// The response body could not be decoded into the expected shape.
    #[error("{upstream} returned an unreadable response: {message}")]
    Decode {
        upstream: &'static str,
        message: String,
    },
}

impl UpstreamError {
    pub fn transport(upstream: &'static str, error: reqwest::Error) -> Self {
        Self::Transport {
            upstream,
            message: error.to_string(),
        }
    }

    /// Duplicate-resource rejection from the upstream.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Status { status: 409, .. })
    }

    /// Credential rejection from the upstream.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

/// Result type for upstream operations.
pub type UpstreamResult<T> = Result<T, UpstreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UpstreamError::NotConfigured { upstream: "assist" };
        assert_eq!(err.to_string(), "assist is not configured");

        let err = UpstreamError::Status {
            upstream: "directory",
            status: 409,
        };
        assert!(err.to_string().contains("409"));
    }

    #[test]
    fn test_status_classification() {
        let conflict = UpstreamError::Status {
            upstream: "directory",
            status: 409,
        };
        assert!(conflict.is_conflict());
        assert!(!conflict.is_unauthorized());

        let denied = UpstreamError::Status {
            upstream: "directory",
            status: 401,
        };
        assert!(denied.is_unauthorized());
    }
}
