//! Token lifecycle orchestration: issuance, rotation, revocation.
//!
//! The only component that mints token pairs. Each refresh-token lineage
//! moves issued -> active -> rotated-out | expired | revoked-by-logout;
//! the terminal states never transition back. Rotation burns the presented
//! JTI atomically with the single-winner registry primitive before the
//! replacement pair is minted, so a leaked refresh token cannot be spent
//! twice even under concurrent rotation attempts.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::jwt::{AccessTokenResult, JwtConfig, JwtError, RefreshTokenResult};
use crate::registry::RevocationRegistry;

/// Caller identity derived per request from a valid access token.
/// Never cached beyond the request that produced it.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
}

/// A freshly minted access/refresh pair. Always issued together.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: AccessTokenResult,
    pub refresh: RefreshTokenResult,
}

/// Why an issue/rotate operation was refused.
#[derive(Debug)]
pub enum AuthFailure {
    /// Refresh token is missing, malformed, badly signed, or expired
    InvalidToken(JwtError),
    /// Refresh token verified but its JTI was already burned
    TokenRevoked,
    /// Registry or codec failure unrelated to the caller's credentials
    Internal(String),
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthFailure::InvalidToken(e) => write!(f, "Invalid refresh token: {}", e),
            AuthFailure::TokenRevoked => write!(f, "Refresh token has been revoked"),
            AuthFailure::Internal(msg) => write!(f, "Internal auth failure: {}", msg),
        }
    }
}

impl std::error::Error for AuthFailure {}

/// Issues, rotates, and revokes token pairs.
///
/// Dependencies are injected at construction; nothing here reads the
/// environment or global state.
#[derive(Clone)]
pub struct SessionService {
    jwt: Arc<JwtConfig>,
    registry: Arc<dyn RevocationRegistry>,
}

impl SessionService {
    pub fn new(jwt: Arc<JwtConfig>, registry: Arc<dyn RevocationRegistry>) -> Self {
        Self { jwt, registry }
    }

    pub fn jwt(&self) -> &JwtConfig {
        &self.jwt
    }

    pub fn registry(&self) -> &Arc<dyn RevocationRegistry> {
        &self.registry
    }

    /// Mint a fresh access/refresh pair for a user.
    /// The two tokens are always issued together, never one without the other.
    pub fn issue(&self, user_id: &str, email: Option<&str>) -> Result<TokenPair, AuthFailure> {
        let access = self
            .jwt
            .generate_access_token(user_id, email)
            .map_err(|e| AuthFailure::Internal(e.to_string()))?;
        let refresh = self
            .jwt
            .generate_refresh_token(user_id, email)
            .map_err(|e| AuthFailure::Internal(e.to_string()))?;

        debug!(user_id = %user_id, jti = %refresh.jti, "Issued token pair");
        Ok(TokenPair { access, refresh })
    }

    /// Exchange a valid, unrevoked refresh token for a new pair.
    ///
    /// The presented JTI is burned before the replacement is minted; if two
    /// rotations race on the same token, the registry guarantees exactly
    /// one wins and the loser gets `TokenRevoked`. On any failure no state
    /// other than the burn is left behind.
    pub async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, AuthFailure> {
        let claims = self
            .jwt
            .validate_refresh_token(refresh_token)
            .map_err(AuthFailure::InvalidToken)?;

        let burned = self
            .registry
            .revoke_if_active(&claims.jti, claims.exp)
            .await
            .map_err(|e| AuthFailure::Internal(e.to_string()))?;

        if !burned {
            warn!(jti = %claims.jti, "Rotation attempt with revoked refresh token");
            return Err(AuthFailure::TokenRevoked);
        }

        let pair = self.issue(&claims.sub, claims.email.as_deref())?;
        debug!(user_id = %claims.sub, old_jti = %claims.jti, new_jti = %pair.refresh.jti, "Rotated refresh token");
        Ok(pair)
    }

    /// Burn the presented refresh token's JTI at logout. Best-effort: a
    /// token that fails to decode is simply skipped so logout (cookie
    /// clearing) always proceeds.
    pub async fn revoke_current(&self, refresh_token: &str) {
        let Ok(claims) = self.jwt.validate_refresh_token(refresh_token) else {
            debug!("Logout with undecodable refresh token; skipping revocation");
            return;
        };

        if let Err(e) = self.registry.revoke(&claims.jti, claims.exp).await {
            warn!(jti = %claims.jti, error = %e, "Failed to record logout revocation");
        }
    }
}
