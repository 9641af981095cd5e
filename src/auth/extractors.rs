//! Session resolution from request cookies.
//!
//! The resolver decodes the access cookie and, when it is expired or
//! absent, attempts exactly one rotation with the refresh cookie. A
//! successful rotation hands the replacement cookies to the response
//! through a task-local picked up by [`propagate_rotated_cookies`].

use std::cell::RefCell;

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderValue, header::SET_COOKIE, request::Parts},
    middleware::Next,
    response::Response,
};

use super::cookie::{
    ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, access_cookie, get_cookie, refresh_cookie,
};
use super::errors::{ApiAuthError, AuthErrorKind};
use crate::session::{Session, SessionService};

/// State types that expose the session service to the auth extractors.
pub trait HasSessionState {
    fn sessions(&self) -> &SessionService;
    fn secure_cookies(&self) -> bool;
}

tokio::task_local! {
    /// Task-local storage for replacement cookies minted by a transparent
    /// rotation. Set by the resolver, drained by the response middleware.
    pub static ROTATED_COOKIES: RefCell<Option<(String, String)>>;
}

/// Response middleware that appends replacement Set-Cookie headers when a
/// transparent rotation happened while handling the request.
pub async fn propagate_rotated_cookies(request: Request, next: Next) -> Response {
    ROTATED_COOKIES
        .scope(RefCell::new(None), async move {
            let mut response = next.run(request).await;

            let rotated = ROTATED_COOKIES.with(|cell| cell.borrow_mut().take());
            if let Some((access, refresh)) = rotated {
                let headers = response.headers_mut();
                if let Ok(value) = HeaderValue::from_str(&access) {
                    headers.append(SET_COOKIE, value);
                }
                if let Ok(value) = HeaderValue::from_str(&refresh) {
                    headers.append(SET_COOKIE, value);
                }
            }

            response
        })
        .await
}

/// Core session resolution shared by the extractors and the route guard.
///
/// Missing cookies are the normal unauthenticated condition, reported as
/// `NotAuthenticated` rather than a hard failure.
pub(crate) async fn resolve_session<S>(parts: &Parts, state: &S) -> Result<Session, AuthErrorKind>
where
    S: HasSessionState + Send + Sync,
{
    // The route guard resolves first and stashes the result; reusing it
    // keeps one resolution (and at most one rotation) per request.
    if let Some(session) = parts.extensions.get::<Session>() {
        return Ok(session.clone());
    }

    let sessions = state.sessions();

    // A valid access token settles it without touching shared state.
    if let Some(access_token) = get_cookie(&parts.headers, ACCESS_COOKIE_NAME) {
        if let Ok(claims) = sessions.jwt().validate_access_token(access_token) {
            return Ok(Session {
                user_id: claims.sub,
                email: claims.email,
            });
        }
    }

    // Access token missing, expired, or invalid - one rotation attempt.
    let refresh_token =
        get_cookie(&parts.headers, REFRESH_COOKIE_NAME).ok_or(AuthErrorKind::NotAuthenticated)?;

    let pair = sessions
        .rotate(refresh_token)
        .await
        .map_err(AuthErrorKind::from)?;

    let secure = state.secure_cookies();
    let _ = ROTATED_COOKIES.try_with(|cell| {
        cell.borrow_mut().replace((
            access_cookie(&pair.access.token, secure),
            refresh_cookie(&pair.refresh.token, secure),
        ));
    });

    let claims = sessions
        .jwt()
        .validate_access_token(&pair.access.token)
        .map_err(|_| AuthErrorKind::Internal)?;

    Ok(Session {
        user_id: claims.sub,
        email: claims.email,
    })
}

/// Extractor for API endpoints that require authentication.
/// Rejects with a JSON 401 that also clears both auth cookies.
pub struct SessionAuth(pub Session);

impl<S> FromRequestParts<S> for SessionAuth
where
    S: HasSessionState + Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        resolve_session(parts, state)
            .await
            .map(SessionAuth)
            .map_err(|kind| ApiAuthError::new(kind, state.secure_cookies()))
    }
}

/// Optional session extractor - never fails.
/// Used by pages and the route guard where "no session" is valid business logic.
pub struct MaybeSession(pub Option<Session>);

impl<S> FromRequestParts<S> for MaybeSession
where
    S: HasSessionState + Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeSession(resolve_session(parts, state).await.ok()))
    }
}
