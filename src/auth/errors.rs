//! Authentication error types.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};

use super::cookie::{clear_access_cookie, clear_refresh_cookie};
use crate::session::AuthFailure;

/// Internal auth error kind used by the session resolver.
#[derive(Debug)]
pub enum AuthErrorKind {
    NotAuthenticated,
    InvalidToken,
    TokenRevoked,
    Internal,
}

impl From<AuthFailure> for AuthErrorKind {
    fn from(failure: AuthFailure) -> Self {
        match failure {
            AuthFailure::InvalidToken(_) => AuthErrorKind::InvalidToken,
            AuthFailure::TokenRevoked => AuthErrorKind::TokenRevoked,
            AuthFailure::Internal(_) => AuthErrorKind::Internal,
        }
    }
}

/// API authentication error (returns JSON and clears both cookies).
///
/// The response message is deliberately uniform for all 401 kinds; the
/// distinction lives in the logs, not in what a probing client sees.
#[derive(Debug)]
pub struct ApiAuthError {
    pub(super) kind: AuthErrorKind,
    pub(super) secure_cookies: bool,
}

impl ApiAuthError {
    pub(super) fn new(kind: AuthErrorKind, secure_cookies: bool) -> Self {
        Self {
            kind,
            secure_cookies,
        }
    }

    fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self.kind {
            AuthErrorKind::NotAuthenticated
            | AuthErrorKind::InvalidToken
            | AuthErrorKind::TokenRevoked => StatusCode::UNAUTHORIZED,
            AuthErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self.kind {
            AuthErrorKind::NotAuthenticated
            | AuthErrorKind::InvalidToken
            | AuthErrorKind::TokenRevoked => "Unauthorized",
            AuthErrorKind::Internal => "Internal server error",
        }
    }
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        use axum::Json;
        use axum::http::HeaderValue;
        use serde::Serialize;

        #[derive(Serialize)]
        struct ErrorResponse {
            message: &'static str,
        }

        let mut response = (
            self.status_code(),
            Json(ErrorResponse {
                message: self.message(),
            }),
        )
            .into_response();

        // Clear both cookies so a dead session does not keep re-presenting
        // unusable credentials.
        let headers = response.headers_mut();
        if let Ok(value) = HeaderValue::from_str(&clear_access_cookie(self.secure_cookies)) {
            headers.append(header::SET_COOKIE, value);
        }
        if let Ok(value) = HeaderValue::from_str(&clear_refresh_cookie(self.secure_cookies)) {
            headers.append(header::SET_COOKIE, value);
        }

        response
    }
}
