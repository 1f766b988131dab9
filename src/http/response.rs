//! Encrypted response bodies.
//!
//! Handlers returning sensitive data wrap it with [`seal`]; the client
//! receives the Base64 envelope as `text/plain`.

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::GatewayError;
use crate::security::PayloadCipher;

/// A Base64 envelope produced by [`PayloadCipher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encrypted(pub String);

impl IntoResponse for Encrypted {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.0,
        )
            .into_response()
    }
}

/// Encrypt `value` for the wire.
pub fn seal<T: Serialize + ?Sized>(cipher: &PayloadCipher, value: &T) -> Result<Encrypted, GatewayError> {
    cipher.encrypt(value).map(Encrypted).ok_or(GatewayError::Cipher)
}
