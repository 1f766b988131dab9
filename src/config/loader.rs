//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_ENCRYPTION_KEY: &str = "BANK_GATEWAY_ENCRYPTION_KEY";
pub const ENV_JWT_SECRET: &str = "BANK_GATEWAY_JWT_SECRET";
pub const ENV_ACCESS_TTL: &str = "BANK_GATEWAY_ACCESS_TTL_SECS";
pub const ENV_REFRESH_TTL: &str = "BANK_GATEWAY_REFRESH_TTL_SECS";
pub const ENV_BIND_ADDRESS: &str = "BANK_GATEWAY_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable {name} is invalid: {reason}")]
    Env { name: &'static str, reason: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, overlay the environment,
/// and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => GatewayConfig::default(),
    };

    apply_env(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML document without validating it.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Overlay environment values onto `config`.
///
/// `lookup` abstracts the environment so tests do not have to mutate the
/// process-wide variables.
pub fn apply_env<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(ENV_ENCRYPTION_KEY) {
        config.security.encryption_key = key;
    }
    if let Some(secret) = lookup(ENV_JWT_SECRET) {
        config.security.jwt_secret = secret;
    }
    if let Some(ttl) = lookup(ENV_ACCESS_TTL) {
        config.security.access_ttl_secs = parse_secs(ENV_ACCESS_TTL, &ttl)?;
    }
    if let Some(ttl) = lookup(ENV_REFRESH_TTL) {
        config.security.refresh_ttl_secs = parse_secs(ENV_REFRESH_TTL, &ttl)?;
    }
    if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
    Ok(())
}

fn parse_secs(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|e: std::num::ParseIntError| ConfigError::Env {
        name,
        reason: e.to_string(),
    })
}
