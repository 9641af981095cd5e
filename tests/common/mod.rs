//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::Router;
use axum::response::Response;
use gatehouse::jwt::{AccessClaims, JwtConfig, TokenType};
use gatehouse::registry::{MemoryRegistry, RevocationRegistry};
use gatehouse::session::SessionService;
use gatehouse::{ServerConfig, create_app};
use jsonwebtoken::{EncodingKey, Header};

pub const TEST_SECRET: &[u8] = b"integration-test-secret-0123456789abcdef";

pub const DEMO_EMAIL: &str = "teste@email.com";
pub const DEMO_PASSWORD: &str = "123456";

pub fn test_config() -> (ServerConfig, SessionService) {
    let registry: Arc<dyn RevocationRegistry> = Arc::new(MemoryRegistry::new());
    let service = SessionService::new(Arc::new(JwtConfig::new(TEST_SECRET)), registry.clone());
    let config = ServerConfig {
        registry,
        jwt_secret: TEST_SECRET.to_vec(),
        secure_cookies: false,
    };
    (config, service)
}

/// App wired to a fresh in-memory registry, plus a service sharing that
/// registry and secret so tests can mint and inspect tokens directly.
pub fn create_test_app() -> (Router, SessionService) {
    let (config, service) = test_config();
    (create_app(&config), service)
}

/// A syntactically valid access token whose expiry is already in the past.
pub fn expired_access_token(user_id: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let claims = AccessClaims {
        sub: user_id.to_string(),
        email: None,
        token_type: TokenType::Access,
        iat: now - 1000,
        exp: now - 500,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET),
    )
    .unwrap()
}

/// All Set-Cookie header values on a response.
pub fn extract_set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

/// Value of the named cookie among Set-Cookie headers, skipping clears.
pub fn cookie_value(cookies: &[String], name: &str) -> Option<String> {
    cookies.iter().find_map(|c| {
        let (pair, _) = c.split_once(';')?;
        let (key, value) = pair.split_once('=')?;
        if key.trim() == name && !value.is_empty() && !c.contains("Max-Age=0") {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// Whether the response clears the named cookie (empty value, Max-Age=0).
pub fn has_cleared_cookie(cookies: &[String], name: &str) -> bool {
    cookies
        .iter()
        .any(|c| c.starts_with(&format!("{}=", name)) && c.contains("Max-Age=0"))
}

/// Consume a response body as JSON.
pub async fn read_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Consume a response body as a UTF-8 string.
pub async fn read_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
