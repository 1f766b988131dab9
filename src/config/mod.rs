//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overlay (secrets, TTLs, bind address)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → consumed once at startup to build the security components
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the allow-list and secrets live for
//!   the whole process
//! - All fields have defaults except the secrets, which must be provided
//! - A validation failure is fatal: the gateway never binds its listener

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AllowListConfig, CookieConfig, DirectoryConfig, GatewayConfig, ListenerConfig,
    ObservabilityConfig, RateLimitConfig, SecurityConfig, SeedUser,
};
pub use validation::ValidationError;
