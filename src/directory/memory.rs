//! In-memory user directory.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::config::SeedUser;
use crate::directory::{Identity, UserDirectory};
use crate::identifiers::generate_account_number;

struct StoredUser {
    identity: Identity,
    password_digest: [u8; 32],
}

/// Thread-safe directory backed by a `HashMap`.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, StoredUser>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(users: &[SeedUser]) -> Self {
        let directory = Self::new();
        for user in users {
            directory.register(&user.subject, &user.display_name, &user.email, &user.password);
        }
        directory
    }

    /// Register (or replace) a user and return the stored identity.
    ///
    /// The account number is generated here, before the record exists.
    pub fn register(&self, subject: &str, display_name: &str, email: &str, password: &str) -> Identity {
        let account_number = generate_account_number(&mut rand::thread_rng());
        let identity = Identity {
            subject: subject.to_string(),
            display_name: display_name.to_string(),
            email: email.to_string(),
            account_number,
        };

        let stored = StoredUser {
            identity: identity.clone(),
            password_digest: digest(password),
        };
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(subject.to_string(), stored);

        tracing::debug!(subject = %subject, "User registered");
        identity
    }

    pub fn len(&self) -> usize {
        self.users.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find(&self, subject: &str) -> Option<Identity> {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(subject)
            .map(|user| user.identity.clone())
    }

    fn verify_password(&self, subject: &str, password: &str) -> Option<Identity> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        let user = users.get(subject)?;
        let matches: bool = user.password_digest[..].ct_eq(&digest(password)[..]).into();
        matches.then(|| user.identity.clone())
    }
}

fn digest(password: &str) -> [u8; 32] {
    Sha256::digest(password.as_bytes()).into()
}
