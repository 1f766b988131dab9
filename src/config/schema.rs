//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// Secrets and token lifetimes.
    pub security: SecurityConfig,

    /// Global token bucket settings.
    pub rate_limit: RateLimitConfig,

    /// Paths exempt from authentication.
    pub allow_list: AllowListConfig,

    /// Session cookie lifetimes.
    pub cookies: CookieConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Users seeded into the in-memory directory at startup.
    pub directory: DirectoryConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Secret material and token lifetimes.
///
/// The key and secret have no usable defaults; they must come from the
/// config file or the environment.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Base64-encoded 256-bit AES key for payload encryption.
    #[serde(skip_serializing)]
    pub encryption_key: String,

    /// HMAC secret for signing session tokens.
    #[serde(skip_serializing)]
    pub jwt_secret: String,

    /// Access token lifetime in seconds.
    pub access_ttl_secs: u64,

    /// Refresh token lifetime in seconds.
    pub refresh_ttl_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            encryption_key: String::new(),
            jwt_secret: String::new(),
            access_ttl_secs: 15 * 60,
            refresh_ttl_secs: 7 * 24 * 60 * 60,
        }
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("encryption_key", &"<redacted>")
            .field("jwt_secret", &"<redacted>")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish()
    }
}

/// Global rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum number of units the bucket holds.
    pub capacity: u64,

    /// Milliseconds per refill interval.
    pub refill_interval_ms: u64,

    /// Units added per elapsed interval.
    pub units_per_interval: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            refill_interval_ms: 2000,
            units_per_interval: 1,
        }
    }
}

/// Path fragments that bypass the gate.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AllowListConfig {
    /// Fragments matched by substring against the request path.
    pub fragments: Vec<String>,
}

impl Default for AllowListConfig {
    fn default() -> Self {
        Self {
            fragments: vec![
                "/api/media/public".to_string(),
                "/api/auth/login".to_string(),
                "/api/auth/login/send-verification".to_string(),
                "/api/auth/register/send-verification".to_string(),
                "/api/auth/register".to_string(),
            ],
        }
    }
}

/// Cookie lifetimes in seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CookieConfig {
    pub access_max_age_secs: i64,
    pub refresh_max_age_secs: i64,
    pub verification_max_age_secs: i64,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            access_max_age_secs: 15 * 60,
            refresh_max_age_secs: 7 * 24 * 60 * 60,
            verification_max_age_secs: 5 * 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directive, overridden by `RUST_LOG` when set.
    pub log_filter: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "bank_gateway=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Seed users for the in-memory directory.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DirectoryConfig {
    pub users: Vec<SeedUser>,
}

/// A user registered at startup.
#[derive(Clone, Deserialize, Serialize)]
pub struct SeedUser {
    pub subject: String,
    pub display_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl std::fmt::Debug for SeedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedUser")
            .field("subject", &self.subject)
            .field("display_name", &self.display_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
