//! HTTP handlers for session establishment and the profile endpoint.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use cookie::Cookie;
use serde::Deserialize;

use crate::error::GatewayError;
use crate::http::{blocking, seal, AppState, AuthenticatedUser};
use crate::security::cookie::REFRESH_TOKEN;
use crate::security::CookieJar;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub subject: String,
    pub password: String,
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, GatewayError> {
    let sessions = state.sessions.clone();
    let (identity, tokens) = blocking(move || sessions.login(&body.subject, &body.password)).await?;

    let cookies = state.sessions.cookies(&tokens);
    with_cookies(seal(&state.cipher, &identity)?, &cookies)
}

/// `POST /api/auth/refresh`, driven by the `REFRESH_TOKEN` cookie.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, GatewayError> {
    let refresh_token = CookieJar::find(&headers, REFRESH_TOKEN).ok_or(GatewayError::InvalidToken)?;

    let sessions = state.sessions.clone();
    let (identity, tokens) = blocking(move || sessions.refresh(&refresh_token)).await?;

    let cookies = state.sessions.cookies(&tokens);
    with_cookies(seal(&state.cipher, &identity)?, &cookies)
}

/// `POST /api/auth/logout`
pub async fn logout(State(state): State<AppState>) -> Result<Response, GatewayError> {
    with_cookies(StatusCode::NO_CONTENT, &state.sessions.clear_cookies())
}

/// `POST /api/auth/login/send-verification`
///
/// Issues the code as a cookie. Delivering it by email is handled elsewhere.
pub async fn send_verification(State(state): State<AppState>) -> Result<Response, GatewayError> {
    let code = crate::session::SessionService::generate_verification_code();
    let cookie = state.sessions.verification_cookie(&code);
    tracing::debug!("Verification code issued");
    with_cookies((StatusCode::ACCEPTED, "Verification code issued"), [&cookie])
}

/// `GET /api/user/profile`
pub async fn profile(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Response, GatewayError> {
    Ok(seal(&state.cipher, &identity)?.into_response())
}

/// `GET /api/media/public/{*file}`
///
/// File serving lives outside the gateway; this route exists so public
/// media paths resolve without credentials.
pub async fn public_media(Path(file): Path<String>) -> Result<Response, GatewayError> {
    if file.is_empty() || file.split('/').any(|segment| segment == "..") {
        return Err(GatewayError::NotFound);
    }
    Ok((StatusCode::OK, file).into_response())
}

fn with_cookies<'a>(
    body: impl IntoResponse,
    cookies: impl IntoIterator<Item = &'a Cookie<'static>>,
) -> Result<Response, GatewayError> {
    let mut response = body.into_response();
    CookieJar::append_to(response.headers_mut(), cookies).map_err(|e| {
        tracing::error!(error = %e, "Cookie value is not a valid header");
        GatewayError::Internal
    })?;
    Ok(response)
}
