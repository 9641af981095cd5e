//! HTTP API surface.

mod auth;
mod error;
mod profile;

pub use error::ApiError;

use axum::Router;

use crate::AppState;

/// Create the API router, mounted by the app under `/api`.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .nest("/auth", auth::router(state.clone()))
        .nest("/user-profile", profile::router(state))
}
