//! Per-request route guard for page routes.
//!
//! A pure policy decision over `(path, session presence)`: protected
//! prefixes require a session, public-only paths bounce authenticated
//! callers to the dashboard, everything else passes through. The
//! protected-path check wins when a path would match both lists.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::extractors::{HasSessionState, resolve_session};

/// Path prefixes that require an authenticated session.
const PROTECTED_PREFIXES: &[&str] = &["/dashboard"];

/// Paths an authenticated caller is redirected away from.
const PUBLIC_ONLY_PATHS: &[&str] = &["/login"];

/// Where unauthenticated callers of protected paths land.
pub const LOGIN_PATH: &str = "/login";

/// Default landing page for authenticated callers.
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Outcome of the route-guard policy for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Pass the request through unchanged
    Allow,
    /// Redirect to the login page
    ToLogin,
    /// Redirect to the authenticated landing page
    ToDashboard,
}

/// Evaluate the guard policy. Pure function, evaluated once per request.
pub fn decide(path: &str, authenticated: bool) -> RouteDecision {
    if PROTECTED_PREFIXES.iter().any(|p| path.starts_with(p)) {
        if authenticated {
            return RouteDecision::Allow;
        }
        return RouteDecision::ToLogin;
    }

    if PUBLIC_ONLY_PATHS.contains(&path) && authenticated {
        return RouteDecision::ToDashboard;
    }

    // Paths on neither list are implicitly public.
    RouteDecision::Allow
}

/// Middleware applying the guard to page routes.
///
/// Resolves the session the same way API extractors do, so a visitor with
/// an expired access cookie but a live refresh cookie is transparently
/// rotated rather than bounced to login.
pub async fn guard_pages<S>(
    State(state): State<S>,
    request: Request,
    next: Next,
) -> Response
where
    S: HasSessionState + Send + Sync,
{
    let (mut parts, body) = request.into_parts();
    let session = resolve_session(&parts, &state).await.ok();
    let authenticated = session.is_some();

    // Hand the resolved session to downstream extractors. A rotation
    // performed here already burned the refresh cookie, so re-resolving
    // from the request would come up empty.
    if let Some(session) = session {
        parts.extensions.insert(session);
    }

    match decide(parts.uri.path(), authenticated) {
        RouteDecision::Allow => next.run(Request::from_parts(parts, body)).await,
        RouteDecision::ToLogin => Redirect::temporary(LOGIN_PATH).into_response(),
        RouteDecision::ToDashboard => Redirect::temporary(DASHBOARD_PATH).into_response(),
    }
}
