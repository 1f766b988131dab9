//! Request gate middleware.
//!
//! Every request passes through here exactly once:
//!
//! ```text
//! path on allow-list ─────────────────────────▶ forward untouched
//! no `Authorization: Bearer` ─────────────────▶ forward, no identity
//! bucket empty ───────────────────────────────▶ 429
//! bad signature / unknown subject / expired ──▶ 401
//! otherwise ──────────────────────────────────▶ attach Identity, forward
//! ```
//!
//! Requests without a bearer token are neither rate limited nor
//! authenticated here; handlers that need an identity reject them through
//! the `AuthenticatedUser` extractor.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::directory::{Identity, UserDirectory};
use crate::error::GatewayError;
use crate::observability::metrics;
use crate::security::{AllowList, RateLimiter, TokenManager};

/// First-pass classification that needs no locking or lookups.
#[derive(Debug, PartialEq, Eq)]
pub enum Admission<'a> {
    Allowed,
    Anonymous,
    Bearer(&'a str),
}

/// Outcome of evaluating one request.
#[derive(Debug)]
pub enum GateDecision {
    Allowed,
    Anonymous,
    Authenticated(Identity),
    Rejected(GatewayError),
}

impl GateDecision {
    pub fn label(&self) -> &'static str {
        match self {
            GateDecision::Allowed => "allowed",
            GateDecision::Anonymous => "anonymous",
            GateDecision::Authenticated(_) => "authenticated",
            GateDecision::Rejected(GatewayError::RateExceeded) => "rate_limited",
            GateDecision::Rejected(GatewayError::InvalidToken) => "unauthorized",
            GateDecision::Rejected(_) => "error",
        }
    }
}

/// The gate's collaborators. Cheap to clone.
#[derive(Clone)]
pub struct RequestGate {
    allow_list: Arc<AllowList>,
    limiter: Arc<RateLimiter>,
    tokens: Arc<TokenManager>,
    directory: Arc<dyn UserDirectory>,
}

impl RequestGate {
    pub fn new(
        allow_list: Arc<AllowList>,
        limiter: Arc<RateLimiter>,
        tokens: Arc<TokenManager>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            allow_list,
            limiter,
            tokens,
            directory,
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn admit<'a>(&self, path: &str, authorization: Option<&'a str>) -> Admission<'a> {
        if self.allow_list.permits(path) {
            return Admission::Allowed;
        }
        match authorization.and_then(bearer_token) {
            Some(token) => Admission::Bearer(token),
            None => Admission::Anonymous,
        }
    }

    /// Rate limit, verify and resolve a bearer token.
    ///
    /// May block on the user directory.
    pub fn authenticate(&self, token: &str) -> GateDecision {
        if !self.limiter.try_consume() {
            return GateDecision::Rejected(GatewayError::RateExceeded);
        }

        let subject = match self.tokens.subject_of(token) {
            Ok(subject) => subject,
            Err(e) => {
                tracing::debug!(error = %e, "Bearer token rejected");
                return GateDecision::Rejected(GatewayError::InvalidToken);
            }
        };

        let Some(identity) = self.directory.find(&subject) else {
            tracing::debug!(subject = %subject, "Token subject not in directory");
            return GateDecision::Rejected(GatewayError::InvalidToken);
        };

        match self.tokens.is_valid(token, &identity.subject) {
            Ok(true) => GateDecision::Authenticated(identity),
            Ok(false) | Err(_) => GateDecision::Rejected(GatewayError::InvalidToken),
        }
    }

    /// Evaluate a request synchronously.
    pub fn evaluate(&self, path: &str, authorization: Option<&str>) -> GateDecision {
        match self.admit(path, authorization) {
            Admission::Allowed => GateDecision::Allowed,
            Admission::Anonymous => GateDecision::Anonymous,
            Admission::Bearer(token) => self.authenticate(token),
        }
    }
}

/// The token after `Bearer `, if the header uses that scheme.
pub fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ")
}

/// Axum middleware running the gate in front of every route.
pub async fn request_gate(
    State(gate): State<RequestGate>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    // Nothing borrowed from the request may live across the await below.
    let pending = {
        let authorization = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        match gate.admit(&path, authorization) {
            Admission::Allowed => Err(GateDecision::Allowed),
            Admission::Anonymous => Err(GateDecision::Anonymous),
            Admission::Bearer(token) => Ok(token.to_string()),
        }
    };

    let decision = match pending {
        Err(decision) => decision,
        Ok(token) => {
            let gate = gate.clone();
            match tokio::task::spawn_blocking(move || gate.authenticate(&token)).await {
                Ok(decision) => decision,
                Err(e) => {
                    tracing::error!(error = %e, "Gate evaluation task failed");
                    GateDecision::Rejected(GatewayError::Internal)
                }
            }
        }
    };

    metrics::record_gate_decision(decision.label());

    match decision {
        GateDecision::Allowed | GateDecision::Anonymous => next.run(request).await,
        GateDecision::Authenticated(identity) => {
            tracing::debug!(subject = %identity.subject, path = %path, "Request authenticated");
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        GateDecision::Rejected(error) => {
            tracing::warn!(path = %path, reason = %error, "Request rejected by gate");
            error.into_response()
        }
    }
}

/// Extractor for handlers that require an authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(GatewayError::InvalidToken)
    }
}
