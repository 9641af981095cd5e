//! Tests for the authenticated client wrapper.
//!
//! End-to-end flows run against a real server on a random port. The
//! refresh-once discipline and its single-flight coalescing are pinned
//! down with a stub backend that counts refresh calls.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use common::{DEMO_EMAIL, DEMO_PASSWORD, test_config};
use gatehouse::client::{AuthClient, ClientError};
use gatehouse::start_server;
use url::Url;

async fn start_client(port: u16) -> AuthClient {
    let (config, _service) = test_config();
    let (_handle, addr) = start_server(config, port).await;
    let base = Url::parse(&format!("http://{}", addr)).unwrap();
    AuthClient::new(base).unwrap()
}

// =============================================================================
// End-to-end against the real server
// =============================================================================

#[tokio::test]
async fn test_login_and_fetch_profile() {
    let client = start_client(0).await;

    let tokens = client.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
    assert!(!tokens.access_token.is_empty());
    assert!(!tokens.refresh_token.is_empty());

    let response = client.get("/api/user-profile").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["email"], "teste@email.com");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let client = start_client(0).await;

    let err = client.login(DEMO_EMAIL, "wrong").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidCredentials));
}

#[tokio::test]
async fn test_session_expires_after_logout() {
    let client = start_client(0).await;

    client.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
    client.logout().await.unwrap();

    // Cookies were cleared by logout, so the call 401s, the refresh
    // attempt 401s too, and the wrapper reports a dead session.
    let err = client.get("/api/user-profile").await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
}

#[tokio::test]
async fn test_unauthenticated_client_reports_session_expired() {
    let client = start_client(0).await;

    let err = client.get("/api/user-profile").await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
}

// =============================================================================
// Refresh-once discipline (stub backend)
// =============================================================================

#[derive(Clone)]
struct StubState {
    /// Refresh calls accepted so far. The profile endpoint rejects
    /// requests until at least one refresh has happened.
    refreshes: Arc<AtomicUsize>,
    refresh_succeeds: bool,
}

async fn stub_profile(State(state): State<StubState>) -> StatusCode {
    if state.refreshes.load(Ordering::SeqCst) > 0 {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    }
}

async fn stub_refresh(State(state): State<StubState>) -> StatusCode {
    if state.refresh_succeeds {
        state.refreshes.fetch_add(1, Ordering::SeqCst);
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    }
}

async fn start_stub(refresh_succeeds: bool) -> (Arc<AtomicUsize>, Url) {
    let refreshes = Arc::new(AtomicUsize::new(0));
    let state = StubState {
        refreshes: refreshes.clone(),
        refresh_succeeds,
    };
    let app = Router::new()
        .route("/api/user-profile", get(stub_profile))
        .route("/api/auth/refresh", post(stub_refresh))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    (refreshes, Url::parse(&format!("http://{}", addr)).unwrap())
}

#[tokio::test]
async fn test_401_triggers_exactly_one_refresh_and_retry() {
    let (refreshes, base) = start_stub(true).await;
    let client = AuthClient::new(base).unwrap();

    let response = client.get("/api/user-profile").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_refresh_is_terminal() {
    let (refreshes, base) = start_stub(false).await;
    let client = AuthClient::new(base).unwrap();

    let err = client.get("/api/user-profile").await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
    assert_eq!(refreshes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_concurrent_401s_coalesce_into_one_refresh() {
    let (refreshes, base) = start_stub(true).await;
    let client = Arc::new(AuthClient::new(base).unwrap());

    let mut handles = Vec::new();
    for _ in 0..6 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.get("/api/user-profile").await
        }));
    }

    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // One rotation served the whole burst.
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);
}
