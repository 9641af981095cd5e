//! Cookie-carried session authentication.
//!
//! Dual-token model: short-lived access tokens (15 min, stateless) and
//! long-lived refresh tokens (7 days, revocation-tracked). The session
//! resolver transparently rotates an expired access token once per
//! request; the route guard decides redirect vs passthrough for pages.

mod cookie;
mod errors;
mod extractors;
mod guard;

pub use cookie::{
    ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, REFRESH_COOKIE_PATH, access_cookie,
    clear_access_cookie, clear_refresh_cookie, get_cookie, refresh_cookie,
};
pub use errors::ApiAuthError;
pub use extractors::{
    HasSessionState, MaybeSession, ROTATED_COOKIES, SessionAuth, propagate_rotated_cookies,
};
pub use guard::{DASHBOARD_PATH, LOGIN_PATH, RouteDecision, decide, guard_pages};
