//! Outbound session cookies.
//!
//! Every cookie the gateway sets is `Secure`, scoped to `/` and
//! `SameSite=Lax`. Only `HttpOnly` and the lifetime vary.

use axum::http::header::{InvalidHeaderValue, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use cookie::time::Duration;
use cookie::{Cookie, SameSite};

pub const ACCESS_TOKEN: &str = "ACCESS_TOKEN";
pub const REFRESH_TOKEN: &str = "REFRESH_TOKEN";
pub const VERIFICATION_CODE: &str = "VERIFICATION_CODE";

/// Builder for cookies with the gateway's fixed security attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieJar;

impl CookieJar {
    /// Build a cookie. `value` is not validated.
    pub fn build(
        name: impl Into<String>,
        value: impl Into<String>,
        http_only: bool,
        max_age_secs: i64,
    ) -> Cookie<'static> {
        Cookie::build((name.into(), value.into()))
            .secure(true)
            .http_only(http_only)
            .path("/")
            .same_site(SameSite::Lax)
            .max_age(Duration::seconds(max_age_secs))
            .build()
    }

    /// Append each cookie as its own `Set-Cookie` header.
    ///
    /// Fails if a value contains bytes that cannot appear in a header.
    pub fn append_to<'a>(
        headers: &mut HeaderMap,
        cookies: impl IntoIterator<Item = &'a Cookie<'static>>,
    ) -> Result<(), InvalidHeaderValue> {
        for cookie in cookies {
            headers.append(SET_COOKIE, HeaderValue::from_str(&cookie.to_string())?);
        }
        Ok(())
    }

    /// Find a named cookie in a request's `Cookie` headers.
    pub fn find(headers: &HeaderMap, name: &str) -> Option<String> {
        headers
            .get_all(axum::http::header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == name)
            .map(|cookie| cookie.value().to_string())
    }
}
