//! Placeholder page handlers.
//!
//! Rendering is out of scope; these exist so the route guard has real
//! routes to protect and redirect between.

use axum::response::Html;

use crate::auth::MaybeSession;

pub async fn index() -> Html<&'static str> {
    Html(
        "<!doctype html><title>Gatehouse</title>\
         <p><a href=\"/login\">Login</a> | <a href=\"/dashboard\">Dashboard</a></p>",
    )
}

pub async fn login() -> Html<&'static str> {
    Html("<!doctype html><title>Login</title><h1>Login</h1>")
}

pub async fn dashboard(MaybeSession(session): MaybeSession) -> Html<String> {
    // The guard only lets authenticated callers through; the fallback
    // label covers direct handler tests.
    let user = session
        .map(|s| s.user_id)
        .unwrap_or_else(|| "unknown".to_string());
    Html(format!(
        "<!doctype html><title>Dashboard</title><h1>Dashboard</h1><p>User: {}</p>",
        user
    ))
}
