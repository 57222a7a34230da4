//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::env;
use crate::config::schema::EdgeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file, with the
/// environment overlay applied on top.
pub fn load_config(path: &Path) -> Result<EdgeConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: EdgeConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build a configuration from defaults plus the environment overlay,
/// for running without a config file.
pub fn load_default() -> Result<EdgeConfig, ConfigError> {
    let mut config = EdgeConfig::default();
    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment-supplied origin lists and secrets to a parsed
/// configuration.
pub fn apply_env_overrides(config: &mut EdgeConfig) {
    apply_origin_overrides(config, env::allowed_origins(), env::blocked_origins());

    if let Some(key) = env::directory_service_key() {
        config.upstreams.directory.service_key = key;
    }
    if let Some(key) = env::assist_api_key() {
        config.upstreams.assist.api_key = key;
    }
}

/// Merge environment origin lists into the configured ones. Lists are
/// unioned; set construction handles trimming and deduplication.
fn apply_origin_overrides(
    config: &mut EdgeConfig,
    allowed: Option<String>,
    blocked: Option<String>,
) {
    if let Some(list) = allowed {
        config.origins.allowed.push(list);
    }
    if let Some(list) = blocked {
        config.origins.blocked.push(list);
    }
}
