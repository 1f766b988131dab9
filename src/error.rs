//! Error types shared across the HTTP surface and startup.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::config::ConfigError;
use crate::security::{CipherError, TokenError};

/// Per-request failures, converted to a status code at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Too many requests. Try again later.")]
    RateExceeded,

    #[error("Unauthorized")]
    InvalidToken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unable to protect response payload")]
    Cipher,

    #[error("{0}")]
    BadRequest(String),

    #[error("Not found")]
    NotFound,

    #[error("Internal server error")]
    Internal,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::RateExceeded => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::InvalidToken | GatewayError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::Cipher | GatewayError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Failures that stop the gateway before it serves traffic.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("encryption key rejected: {0}")]
    Cipher(#[from] CipherError),

    #[error("token manager rejected: {0}")]
    Token(#[from] TokenError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_body_mapping() {
        let cases = [
            (GatewayError::RateExceeded, 429, "Too many requests. Try again later."),
            (GatewayError::InvalidToken, 401, "Unauthorized"),
            (GatewayError::InvalidCredentials, 401, "Invalid credentials"),
            (GatewayError::Cipher, 500, "Unable to protect response payload"),
            (GatewayError::NotFound, 404, "Not found"),
        ];
        for (error, status, body) in cases {
            assert_eq!(error.status().as_u16(), status);
            assert_eq!(error.to_string(), body);
        }
    }
}
