//! User lookup collaborator.
//!
//! The gate and the session service only need two questions answered:
//! "who is this subject?" and "is this their password?". Persistence is
//! someone else's concern; `InMemoryUserDirectory` is the reference
//! implementation used by the binary and the tests.

pub mod memory;

use serde::{Deserialize, Serialize};

pub use memory::InMemoryUserDirectory;

/// The authenticated principal attached to a request.
///
/// Handlers read it from request extensions; it is never stored in a
/// global or thread-local.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject: String,
    pub display_name: String,
    pub email: String,
    pub account_number: String,
}

/// Lookup of stored identities.
///
/// Implementations may block (database, remote directory); the gate calls
/// them off the async executor.
pub trait UserDirectory: Send + Sync {
    fn find(&self, subject: &str) -> Option<Identity>;

    /// The identity for `subject` if `password` matches.
    fn verify_password(&self, subject: &str, password: &str) -> Option<Identity>;
}
