//! Login, refresh and cookie packaging.

use std::sync::Arc;

use cookie::Cookie;
use rand::Rng;

use crate::config::CookieConfig;
use crate::directory::{Identity, UserDirectory};
use crate::error::GatewayError;
use crate::security::cookie::{ACCESS_TOKEN, REFRESH_TOKEN, VERIFICATION_CODE};
use crate::security::{CookieJar, TokenKind, TokenManager};

/// A freshly minted token pair.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access: String,
    pub refresh: String,
}

/// Establishes and renews sessions. Every call may block on the directory.
pub struct SessionService {
    tokens: Arc<TokenManager>,
    directory: Arc<dyn UserDirectory>,
    cookies: CookieConfig,
}

impl SessionService {
    pub fn new(tokens: Arc<TokenManager>, directory: Arc<dyn UserDirectory>, cookies: CookieConfig) -> Self {
        Self {
            tokens,
            directory,
            cookies,
        }
    }

    pub fn login(&self, subject: &str, password: &str) -> Result<(Identity, SessionTokens), GatewayError> {
        let identity = self
            .directory
            .verify_password(subject, password)
            .ok_or(GatewayError::InvalidCredentials)?;

        let tokens = self.mint(&identity.subject)?;
        tracing::info!(subject = %identity.subject, "Session established");
        Ok((identity, tokens))
    }

    /// Exchange a refresh token for a new pair.
    pub fn refresh(&self, refresh_token: &str) -> Result<(Identity, SessionTokens), GatewayError> {
        let subject = self
            .tokens
            .subject_of(refresh_token)
            .map_err(|_| GatewayError::InvalidToken)?;
        let identity = self.directory.find(&subject).ok_or(GatewayError::InvalidToken)?;

        match self.tokens.is_valid(refresh_token, &identity.subject) {
            Ok(true) => {}
            Ok(false) | Err(_) => return Err(GatewayError::InvalidToken),
        }

        let tokens = self.mint(&identity.subject)?;
        tracing::info!(subject = %identity.subject, "Session refreshed");
        Ok((identity, tokens))
    }

    fn mint(&self, subject: &str) -> Result<SessionTokens, GatewayError> {
        let issue = |kind| {
            self.tokens.issue(subject, kind).map_err(|e| {
                tracing::error!(error = %e, "Token issuance failed");
                GatewayError::Internal
            })
        };
        Ok(SessionTokens {
            access: issue(TokenKind::Access)?,
            refresh: issue(TokenKind::Refresh)?,
        })
    }

    pub fn cookies(&self, tokens: &SessionTokens) -> [Cookie<'static>; 2] {
        [
            CookieJar::build(ACCESS_TOKEN, tokens.access.clone(), true, self.cookies.access_max_age_secs),
            CookieJar::build(REFRESH_TOKEN, tokens.refresh.clone(), true, self.cookies.refresh_max_age_secs),
        ]
    }

    /// Expire both session cookies on the client.
    pub fn clear_cookies(&self) -> [Cookie<'static>; 2] {
        [
            CookieJar::build(ACCESS_TOKEN, "", true, 0),
            CookieJar::build(REFRESH_TOKEN, "", true, 0),
        ]
    }

    /// Script-readable cookie carrying a verification code.
    pub fn verification_cookie(&self, code: &str) -> Cookie<'static> {
        CookieJar::build(VERIFICATION_CODE, code, false, self.cookies.verification_max_age_secs)
    }

    /// Six random digits.
    pub fn generate_verification_code() -> String {
        format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
    }
}
