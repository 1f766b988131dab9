//! Session token issuance and validation.
//!
//! Tokens are HS256-signed JWTs carrying `sub`, `iat` and `exp`. Access and
//! refresh tokens share a structure and differ only in lifetime. Nothing is
//! stored server-side.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;
use crate::observability::metrics;

/// Claims embedded in every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identifier.
    pub sub: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: u64,
    /// Expiration, seconds since the Unix epoch.
    pub exp: u64,
}

/// Which lifetime policy a token is minted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token signing secret is not configured")]
    MissingSecret,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Mints and validates stateless bearer tokens.
#[derive(Clone)]
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenManager {
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        // Expiry is checked by `is_valid_at` so the boundary is ours, not the
        // library's leeway-adjusted one.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
            refresh_ttl,
        })
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, TokenError> {
        Self::new(
            config.jwt_secret.as_bytes(),
            Duration::from_secs(config.access_ttl_secs),
            Duration::from_secs(config.refresh_ttl_secs),
        )
    }

    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Mint a token for `subject` expiring one TTL from now.
    pub fn issue(&self, subject: &str, kind: TokenKind) -> Result<String, TokenError> {
        self.issue_at(subject, kind, unix_now())
    }

    /// Mint a token as if the current time were `now` (Unix seconds).
    pub fn issue_at(&self, subject: &str, kind: TokenKind, now: u64) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl(kind).as_secs()),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        metrics::record_token_issued(kind.as_str());
        Ok(token)
    }

    /// Verify the signature and return the claims, ignoring expiry.
    pub fn claims(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::Invalid("bad signature".to_string()),
                ErrorKind::InvalidToken => TokenError::Invalid("malformed".to_string()),
                ErrorKind::MissingRequiredClaim(claim) => {
                    TokenError::Invalid(format!("missing claim {}", claim))
                }
                _ => TokenError::Invalid(e.to_string()),
            })
    }

    /// The subject of a correctly signed token.
    pub fn subject_of(&self, token: &str) -> Result<String, TokenError> {
        self.claims(token).map(|claims| claims.sub)
    }

    /// Whether `token` is signed by us, names `expected_subject`, and has not
    /// expired. Malformed or unsigned tokens are an error, not `false`.
    pub fn is_valid(&self, token: &str, expected_subject: &str) -> Result<bool, TokenError> {
        self.is_valid_at(token, expected_subject, unix_now())
    }

    /// `is_valid` against an explicit clock reading (Unix seconds).
    ///
    /// A token whose expiry equals `now` is still valid.
    pub fn is_valid_at(&self, token: &str, expected_subject: &str, now: u64) -> Result<bool, TokenError> {
        let claims = self.claims(token)?;
        Ok(claims.sub == expected_subject && claims.exp >= now)
    }
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

/// Seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"unit-test-signing-secret-0123456789";

    fn manager() -> TokenManager {
        TokenManager::new(SECRET, Duration::from_secs(900), Duration::from_secs(86_400)).unwrap()
    }

    #[test]
    fn test_subject_round_trip_for_both_kinds() {
        let tokens = manager();
        for kind in [TokenKind::Access, TokenKind::Refresh] {
            for subject in ["alice", "1234567890", "user@example.com", ""] {
                let token = tokens.issue(subject, kind).unwrap();
                assert_eq!(tokens.subject_of(&token).unwrap(), subject);
            }
        }
    }

    #[test]
    fn test_expiry_follows_kind() {
        let tokens = manager();
        let access = tokens.claims(&tokens.issue_at("bob", TokenKind::Access, 1_000).unwrap()).unwrap();
        let refresh = tokens.claims(&tokens.issue_at("bob", TokenKind::Refresh, 1_000).unwrap()).unwrap();

        assert_eq!(access.iat, 1_000);
        assert_eq!(access.exp, 1_900);
        assert_eq!(refresh.exp, 87_400);
    }

    #[test]
    fn test_valid_until_ttl_elapses() {
        let tokens = manager();
        let issued = 1_700_000_000;
        let token = tokens.issue_at("carol", TokenKind::Access, issued).unwrap();

        assert!(tokens.is_valid_at(&token, "carol", issued).unwrap());
        assert!(!tokens.is_valid_at(&token, "carol", issued + 901).unwrap());
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let tokens = manager();
        let token = tokens.issue_at("dave", TokenKind::Access, 0).unwrap();

        assert!(tokens.is_valid_at(&token, "dave", 900).unwrap());
        assert!(!tokens.is_valid_at(&token, "dave", 901).unwrap());
    }

    #[test]
    fn test_fresh_token_is_valid_against_wall_clock() {
        let tokens = manager();
        let token = tokens.issue("erin", TokenKind::Refresh).unwrap();
        assert!(tokens.is_valid(&token, "erin").unwrap());
    }

    #[test]
    fn test_wrong_subject_is_invalid() {
        let tokens = manager();
        let token = tokens.issue("frank", TokenKind::Access).unwrap();
        assert!(!tokens.is_valid(&token, "grace").unwrap());
    }

    #[test]
    fn test_malformed_and_foreign_tokens_are_errors() {
        let tokens = manager();
        assert!(matches!(tokens.subject_of("not-a-jwt"), Err(TokenError::Invalid(_))));
        assert!(tokens.is_valid("a.b.c", "anyone").is_err());

        let other = TokenManager::new(b"some-other-secret", Duration::from_secs(60), Duration::from_secs(60)).unwrap();
        let foreign = other.issue("mallory", TokenKind::Access).unwrap();
        assert!(matches!(tokens.subject_of(&foreign), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let tokens = manager();
        let token = tokens.issue("heidi", TokenKind::Access).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = tokens.issue("ivan", TokenKind::Access).unwrap();
        let forged_payload = forged.split('.').nth(1).unwrap().to_string();
        parts[1] = &forged_payload;

        assert!(tokens.subject_of(&parts.join(".")).is_err());
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        let result = TokenManager::new(b"", Duration::from_secs(1), Duration::from_secs(1));
        assert!(matches!(result, Err(TokenError::MissingSecret)));
    }
}
