//! Configuration validation.
//!
//! Serde handles syntax; this module checks the values themselves. Every
//! problem is collected so an operator sees all of them in one pass.

use std::net::SocketAddr;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::config::schema::GatewayConfig;
use crate::security::cipher::KEY_LENGTH;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("security.encryption_key is not set")]
    MissingEncryptionKey,

    #[error("security.encryption_key is not valid base64")]
    EncryptionKeyNotBase64,

    #[error("security.encryption_key must decode to {expected} bytes, got {actual}")]
    EncryptionKeyLength { expected: usize, actual: usize },

    #[error("security.jwt_secret is not set")]
    MissingJwtSecret,

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("security.refresh_ttl_secs ({refresh}) is shorter than access_ttl_secs ({access})")]
    RefreshShorterThanAccess { access: u64, refresh: u64 },

    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("allow_list contains an empty fragment")]
    EmptyAllowFragment,
}

/// Validate a loaded configuration, returning every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let security = &config.security;

    if security.encryption_key.is_empty() {
        errors.push(ValidationError::MissingEncryptionKey);
    } else {
        match STANDARD.decode(security.encryption_key.trim()) {
            Ok(bytes) if bytes.len() != KEY_LENGTH => {
                errors.push(ValidationError::EncryptionKeyLength {
                    expected: KEY_LENGTH,
                    actual: bytes.len(),
                });
            }
            Ok(_) => {}
            Err(_) => errors.push(ValidationError::EncryptionKeyNotBase64),
        }
    }

    if security.jwt_secret.is_empty() {
        errors.push(ValidationError::MissingJwtSecret);
    }
    if security.access_ttl_secs == 0 {
        errors.push(ValidationError::Zero("security.access_ttl_secs"));
    }
    if security.refresh_ttl_secs == 0 {
        errors.push(ValidationError::Zero("security.refresh_ttl_secs"));
    }
    if security.access_ttl_secs > 0
        && security.refresh_ttl_secs > 0
        && security.refresh_ttl_secs < security.access_ttl_secs
    {
        errors.push(ValidationError::RefreshShorterThanAccess {
            access: security.access_ttl_secs,
            refresh: security.refresh_ttl_secs,
        });
    }

    if config.rate_limit.capacity == 0 {
        errors.push(ValidationError::Zero("rate_limit.capacity"));
    }
    if config.rate_limit.refill_interval_ms == 0 {
        errors.push(ValidationError::Zero("rate_limit.refill_interval_ms"));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.allow_list.fragments.iter().any(|f| f.is_empty()) {
        errors.push(ValidationError::EmptyAllowFragment);
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

    fn valid_config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.security.encryption_key = STANDARD.encode([7u8; KEY_LENGTH]);
        config.security.jwt_secret = "a-long-enough-signing-secret-for-tests".to_string();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert_eq!(validate_config(&valid_config()), Ok(()));
    }

    #[test]
    fn test_default_config_is_missing_secrets() {
        let errors = validate_config(&GatewayConfig::default()).unwrap_err();
        assert!(errors.contains(&ValidationError::MissingEncryptionKey));
        assert!(errors.contains(&ValidationError::MissingJwtSecret));
    }

    #[test]
    fn test_short_key_rejected() {
        let mut config = valid_config();
        config.security.encryption_key = STANDARD.encode([1u8; 16]);
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::EncryptionKeyLength { expected: 32, actual: 16 }]
        );
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.security.encryption_key = "not base64 !!".to_string();
        config.rate_limit.capacity = 0;
        config.rate_limit.refill_interval_ms = 0;
        config.listener.bind_address = "nowhere".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::EncryptionKeyNotBase64));
        assert!(errors.contains(&ValidationError::Zero("rate_limit.capacity")));
    }

    #[test]
    fn test_refresh_must_outlive_access() {
        let mut config = valid_config();
        config.security.access_ttl_secs = 600;
        config.security.refresh_ttl_secs = 60;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::RefreshShorterThanAccess { access: 600, refresh: 60 }]
        );
    }
}
