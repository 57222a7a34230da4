//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ratios in bounds)
//! - Check addresses and upstream URLs actually parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EdgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::EdgeConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidAddress { field: &'static str, value: String },
    InvalidUrl { field: &'static str, value: String },
    OutOfRange { field: &'static str, detail: String },
    MissingValue { field: &'static str },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidAddress { field, value } => {
                write!(f, "{}: not a valid socket address: {:?}", field, value)
            }
            ValidationError::InvalidUrl { field, value } => {
                write!(f, "{}: not a valid URL: {:?}", field, value)
            }
            ValidationError::OutOfRange { field, detail } => {
                write!(f, "{}: {}", field, detail)
            }
            ValidationError::MissingValue { field } => {
                write!(f, "{}: value required", field)
            }
        }
    }
}

fn check_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if !value.is_empty() && Url::parse(value).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}

/// Validate a parsed configuration, collecting every failure.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);

    if config.observability.metrics_enabled {
        check_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.admin.enabled {
        check_addr(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.admin.api_key.trim().is_empty() {
            errors.push(ValidationError::MissingValue {
                field: "admin.api_key",
            });
        }
    }

    check_url(
        &mut errors,
        "upstreams.directory.base_url",
        &config.upstreams.directory.base_url,
    );
    check_url(
        &mut errors,
        "upstreams.assist.base_url",
        &config.upstreams.assist.base_url,
    );
    check_url(
        &mut errors,
        "upstreams.relay.base_url",
        &config.upstreams.relay.base_url,
    );
    if config.upstreams.relay.enabled && config.upstreams.relay.base_url.is_empty() {
        errors.push(ValidationError::MissingValue {
            field: "upstreams.relay.base_url",
        });
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::OutOfRange {
            field: "retries.max_attempts",
            detail: "must be at least 1".to_string(),
        });
    }
    if !(0.0..=1.0).contains(&config.retries.budget_ratio) {
        errors.push(ValidationError::OutOfRange {
            field: "retries.budget_ratio",
            detail: format!("{} is outside 0.0..=1.0", config.retries.budget_ratio),
        });
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::OutOfRange {
            field: "retries.base_delay_ms",
            detail: "base delay exceeds max delay".to_string(),
        });
    }

    if config.rate_limit.enabled {
        if config.rate_limit.requests_per_second == 0 {
            errors.push(ValidationError::OutOfRange {
                field: "rate_limit.requests_per_second",
                detail: "must be positive when rate limiting is enabled".to_string(),
            });
        }
        if config.rate_limit.burst_size == 0 {
            errors.push(ValidationError::OutOfRange {
                field: "rate_limit.burst_size",
                detail: "must be positive when rate limiting is enabled".to_string(),
            });
        }
    }

    if config.timeouts.request_secs == 0 || config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::OutOfRange {
            field: "timeouts",
            detail: "request and upstream timeouts must be positive".to_string(),
        });
    }

    if config.health_check.enabled
        && (config.health_check.interval_secs == 0 || config.health_check.timeout_secs == 0)
    {
        errors.push(ValidationError::OutOfRange {
            field: "health_check",
            detail: "interval and timeout must be positive when enabled".to_string(),
        });
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::OutOfRange {
            field: "security.max_body_size",
            detail: "must be positive".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&EdgeConfig::default()).is_ok());
    }

    #[test]
    fn test_all_errors_are_collected() {
        let mut config = EdgeConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.retries.max_attempts = 0;
        config.retries.budget_ratio = 2.0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_enabled_relay_requires_base_url() {
        let mut config = EdgeConfig::default();
        config.upstreams.relay.enabled = true;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::MissingValue { field } if *field == "upstreams.relay.base_url")));
    }

    #[test]
    fn test_admin_requires_api_key() {
        let mut config = EdgeConfig::default();
        config.admin.enabled = true;
        config.admin.api_key = "  ".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_bad_upstream_url_is_rejected() {
        let mut config = EdgeConfig::default();
        config.upstreams.assist.base_url = "not a url".into();
        assert!(validate_config(&config).is_err());
    }
}
