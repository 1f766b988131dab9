//! Session establishment.
//!
//! # Data Flow
//! ```text
//! POST /api/auth/login
//!     → directory: verify password
//!     → token.rs: mint access + refresh tokens
//!     → cookie.rs: ACCESS_TOKEN / REFRESH_TOKEN cookies
//!     → cipher.rs: encrypted identity in the body
//!
//! POST /api/auth/refresh
//!     → REFRESH_TOKEN cookie → validate → re-check directory → new pair
//! ```

pub mod handlers;
pub mod service;

pub use service::{SessionService, SessionTokens};
