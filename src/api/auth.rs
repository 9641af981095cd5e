//! Authentication API endpoints.
//!
//! - POST `/login` - Validate credentials, issue an access/refresh pair
//! - POST `/refresh` - Exchange the refresh cookie for a rotated pair
//! - POST `/logout` - Revoke the refresh token and clear cookies

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::ApiError;
use crate::AppState;
use crate::auth::{
    REFRESH_COOKIE_NAME, access_cookie, clear_access_cookie, clear_refresh_cookie, get_cookie,
    refresh_cookie,
};
use crate::session::AuthFailure;

/// Prototype credential check; a real deployment swaps this for one call
/// against a user store.
const DEMO_EMAIL: &str = "teste@email.com";
const DEMO_PASSWORD: &str = "123456";
const DEMO_USER_ID: &str = "user-123";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .with_state(state)
}

#[derive(Deserialize)]
struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
    message: &'static str,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

/// Validate credentials and issue a token pair.
/// Tokens are returned in the body and set as cookies.
async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    // Manual body parse so malformed JSON gets the documented 400 shape
    // instead of the extractor's default rejection.
    let request: LoginRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::bad_request("Invalid JSON payload"))?;

    let (Some(email), Some(password)) = (request.email, request.password) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };

    if email != DEMO_EMAIL || password != DEMO_PASSWORD {
        warn!(email = %email, "Failed login attempt");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let pair = state
        .sessions
        .issue(DEMO_USER_ID, Some(&email))
        .map_err(|e| ApiError::internal_error("Failed to issue token pair", e))?;

    info!(user_id = DEMO_USER_ID, "Login");

    let secure = state.secure_cookies;
    Ok((
        StatusCode::OK,
        AppendHeaders([
            (SET_COOKIE, access_cookie(&pair.access.token, secure)),
            (SET_COOKIE, refresh_cookie(&pair.refresh.token, secure)),
        ]),
        Json(LoginResponse {
            access_token: pair.access.token,
            refresh_token: pair.refresh.token,
            message: "ok",
        }),
    ))
}

/// Rotate the refresh token presented in the cookie.
/// On success both cookies are replaced; the old refresh token is burned
/// before the replacement exists, so it can never be spent again.
async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = get_cookie(&headers, REFRESH_COOKIE_NAME)
        .ok_or_else(|| ApiError::unauthorized("No refresh token found"))?;

    let pair = state.sessions.rotate(refresh_token).await.map_err(|e| match e {
        AuthFailure::InvalidToken(_) => ApiError::unauthorized("Invalid refresh token"),
        AuthFailure::TokenRevoked => ApiError::unauthorized("Refresh token has been revoked"),
        AuthFailure::Internal(msg) => ApiError::internal_error("Rotation failed", msg),
    })?;

    let secure = state.secure_cookies;
    Ok((
        StatusCode::OK,
        AppendHeaders([
            (SET_COOKIE, access_cookie(&pair.access.token, secure)),
            (SET_COOKIE, refresh_cookie(&pair.refresh.token, secure)),
        ]),
        Json(MessageResponse { message: "ok" }),
    ))
}

/// Logout - revoke the refresh token and clear both cookies.
/// Always succeeds from the caller's perspective; revocation bookkeeping
/// failures are logged, never surfaced.
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(refresh_token) = get_cookie(&headers, REFRESH_COOKIE_NAME) {
        state.sessions.revoke_current(refresh_token).await;
    }

    let secure = state.secure_cookies;
    (
        StatusCode::OK,
        AppendHeaders([
            (SET_COOKIE, clear_access_cookie(secure)),
            (SET_COOKIE, clear_refresh_cookie(secure)),
        ]),
        Json(MessageResponse {
            message: "Logged out successfully",
        }),
    )
}
