//! User profile endpoint, the one protected resource in the prototype.

use axum::{Json, Router, routing::get};
use serde::Serialize;
use tracing::debug;

use crate::AppState;
use crate::auth::SessionAuth;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(user_profile))
        .with_state(state)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserProfileResponse {
    name: &'static str,
    email: &'static str,
    member_since: &'static str,
}

/// Return the caller's profile. Static prototype data; the session gate is
/// the point, not the payload.
async fn user_profile(SessionAuth(session): SessionAuth) -> Json<UserProfileResponse> {
    debug!(user_id = %session.user_id, "Serving user profile");

    Json(UserProfileResponse {
        name: "Usuário Teste",
        email: "teste@email.com",
        member_since: "2023-01-15",
    })
}
