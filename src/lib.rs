//! Request gatekeeping and payload protection for the banking backend.
//!
//! Every inbound request passes an allow-list check, a global token bucket
//! and bearer-token authentication before it reaches a handler. Sensitive
//! response bodies are AES-encrypted, and sessions travel in signed,
//! scoped cookies.

pub mod config;
pub mod directory;
pub mod error;
pub mod http;
pub mod identifiers;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod session;

pub use config::GatewayConfig;
pub use error::{GatewayError, StartupError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
