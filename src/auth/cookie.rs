//! Cookie parsing and construction for authentication.
//!
//! The refresh cookie is path-scoped to the refresh endpoint and carries a
//! stricter SameSite policy than the access cookie. Only the API handlers
//! and the session extractor write or clear these; everything else reads.

use axum::http::header;

use crate::jwt::{ACCESS_TOKEN_DURATION_SECS, REFRESH_TOKEN_DURATION_SECS};

/// Cookie name for the access token (short-lived, 15 minutes).
pub const ACCESS_COOKIE_NAME: &str = "access-token";

/// Cookie name for the refresh token (long-lived, 7 days).
pub const REFRESH_COOKIE_NAME: &str = "refresh-token";

/// The refresh cookie is only ever sent to the rotation endpoint.
pub const REFRESH_COOKIE_PATH: &str = "/api/auth/refresh";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

fn secure_suffix(secure: bool) -> &'static str {
    if secure { "; Secure" } else { "" }
}

/// Build the Set-Cookie value for a new access token.
pub fn access_cookie(token: &str, secure: bool) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        ACCESS_COOKIE_NAME,
        token,
        ACCESS_TOKEN_DURATION_SECS,
        secure_suffix(secure)
    )
}

/// Build the Set-Cookie value for a new refresh token.
pub fn refresh_cookie(token: &str, secure: bool) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path={}; Max-Age={}{}",
        REFRESH_COOKIE_NAME,
        token,
        REFRESH_COOKIE_PATH,
        REFRESH_TOKEN_DURATION_SECS,
        secure_suffix(secure)
    )
}

/// Build the Set-Cookie value clearing the access token.
pub fn clear_access_cookie(secure: bool) -> String {
    format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0{}",
        ACCESS_COOKIE_NAME,
        secure_suffix(secure)
    )
}

/// Build the Set-Cookie value clearing the refresh token.
pub fn clear_refresh_cookie(secure: bool) -> String {
    format!(
        "{}=; HttpOnly; SameSite=Strict; Path={}; Max-Age=0{}",
        REFRESH_COOKIE_NAME,
        REFRESH_COOKIE_PATH,
        secure_suffix(secure)
    )
}
