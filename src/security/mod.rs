//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (see http::gate):
//!     → allow_list.rs (exempt public paths)
//!     → rate_limit.rs (global token bucket)
//!     → token.rs (verify bearer token, extract subject)
//!     → Pass to handlers with the resolved identity
//!
//! Outgoing response:
//!     → cipher.rs (encrypt sensitive payloads)
//!     → cookie.rs (session cookies with fixed attributes)
//! ```
//!
//! # Design Decisions
//! - Fail closed: a token that cannot be verified is never trusted
//! - No server-side session state; tokens are self-contained
//! - The rate bucket is the only shared mutable state

pub mod allow_list;
pub mod cipher;
pub mod cookie;
pub mod rate_limit;
pub mod token;

pub use allow_list::AllowList;
pub use cipher::{CipherError, PayloadCipher};
pub use cookie::CookieJar;
pub use rate_limit::RateLimiter;
pub use token::{Claims, TokenError, TokenKind, TokenManager};
