//! Signed token generation and verification.
//!
//! Dual-token codec: short-lived access tokens (15 minutes, stateless, no
//! JTI) and long-lived refresh tokens (7 days, JTI-tracked for revocation).
//! The signing algorithm is pinned to HS256; tokens carrying any other
//! algorithm fail verification.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Token type for distinguishing access vs refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived access token (15 minutes) - stateless, no JTI
    Access,
    /// Long-lived refresh token (7 days) - JTI tracked for revocation
    Refresh,
}

/// JWT claims for access tokens (stateless, no JTI).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user id)
    pub sub: String,
    /// Email, when known at issuance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Token type
    #[serde(rename = "typ")]
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// JWT claims for refresh tokens (tracked with JTI).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// JWT ID (unique identifier for revocation tracking)
    pub jti: String,
    /// Subject (user id)
    pub sub: String,
    /// Email, when known at issuance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Token type
    #[serde(rename = "typ")]
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Access token duration: 15 minutes
pub const ACCESS_TOKEN_DURATION_SECS: u64 = 15 * 60;

/// Refresh token duration: 7 days
pub const REFRESH_TOKEN_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Configuration for JWT operations.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

/// Result of generating an access token (no JTI).
#[derive(Debug, Clone)]
pub struct AccessTokenResult {
    /// The JWT token string
    pub token: String,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: u64,
    /// Token duration in seconds
    pub duration: u64,
}

/// Result of generating a refresh token (with JTI for tracking).
#[derive(Debug, Clone)]
pub struct RefreshTokenResult {
    /// The JWT token string
    pub token: String,
    /// JWT ID (unique identifier for revocation tracking)
    pub jti: String,
    /// Issued at timestamp (Unix seconds)
    pub issued_at: u64,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: u64,
    /// Token duration in seconds
    pub duration: u64,
}

fn unix_now() -> Result<u64, JwtError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| JwtError::TimeError)
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret.
    /// Secret length is enforced at startup by the CLI layer.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Generate an access token for a user.
    /// Access tokens are short-lived (15 minutes), stateless, and have no JTI.
    pub fn generate_access_token(
        &self,
        user_id: &str,
        email: Option<&str>,
    ) -> Result<AccessTokenResult, JwtError> {
        let now = unix_now()?;
        let exp = now + ACCESS_TOKEN_DURATION_SECS;

        let claims = AccessClaims {
            sub: user_id.to_string(),
            email: email.map(str::to_string),
            token_type: TokenType::Access,
            iat: now,
            exp,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)?;

        Ok(AccessTokenResult {
            token,
            expires_at: exp,
            duration: ACCESS_TOKEN_DURATION_SECS,
        })
    }

    /// Generate a refresh token for a user with a fresh JTI.
    /// Refresh tokens are long-lived (7 days) and tracked for revocation.
    pub fn generate_refresh_token(
        &self,
        user_id: &str,
        email: Option<&str>,
    ) -> Result<RefreshTokenResult, JwtError> {
        let now = unix_now()?;
        let jti = uuid::Uuid::new_v4().to_string();
        let exp = now + REFRESH_TOKEN_DURATION_SECS;

        let claims = RefreshClaims {
            jti: jti.clone(),
            sub: user_id.to_string(),
            email: email.map(str::to_string),
            token_type: TokenType::Refresh,
            iat: now,
            exp,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)?;

        Ok(RefreshTokenResult {
            token,
            jti,
            issued_at: now,
            expires_at: exp,
            duration: REFRESH_TOKEN_DURATION_SECS,
        })
    }

    /// Validate and decode an access token.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, JwtError> {
        let token_data =
            jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &validation())
                .map_err(JwtError::from_decode)?;

        if token_data.claims.token_type != TokenType::Access {
            return Err(JwtError::WrongTokenType);
        }

        Ok(token_data.claims)
    }

    /// Validate and decode a refresh token.
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, JwtError> {
        let token_data =
            jsonwebtoken::decode::<RefreshClaims>(token, &self.decoding_key, &validation())
                .map_err(JwtError::from_decode)?;

        if token_data.claims.token_type != TokenType::Refresh {
            return Err(JwtError::WrongTokenType);
        }

        Ok(token_data.claims)
    }
}

/// Errors that can occur during JWT operations.
///
/// Verification failures are split so callers can decide between "reject"
/// (`Malformed`, `BadSignature`) and "attempt refresh" (`Expired`).
#[derive(Debug)]
pub enum JwtError {
    /// Token is not a structurally valid JWT
    Malformed,
    /// Signature does not verify, or the algorithm is not HS256
    BadSignature,
    /// Signature is valid but the token has expired
    Expired,
    /// Wrong token type (e.g., using a refresh token as an access token)
    WrongTokenType,
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// System time error
    TimeError,
}

impl JwtError {
    fn from_decode(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => JwtError::BadSignature,
            _ => JwtError::Malformed,
        }
    }

    /// Whether the token was cryptographically valid but past its expiry.
    pub fn is_expired(&self) -> bool {
        matches!(self, JwtError::Expired)
    }
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Malformed => write!(f, "Malformed token"),
            JwtError::BadSignature => write!(f, "Invalid token signature"),
            JwtError::Expired => write!(f, "Token has expired"),
            JwtError::WrongTokenType => write!(f, "Wrong token type"),
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::TimeError => write!(f, "System time error"),
        }
    }
}

impl std::error::Error for JwtError {}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-key-that-is-long-enough-32";

    #[test]
    fn test_generate_and_validate_access_token() {
        let config = JwtConfig::new(SECRET);

        let result = config
            .generate_access_token("user-123", Some("teste@email.com"))
            .unwrap();

        assert_eq!(result.duration, ACCESS_TOKEN_DURATION_SECS);

        let claims = config.validate_access_token(&result.token).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.email.as_deref(), Some("teste@email.com"));
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp, claims.iat + ACCESS_TOKEN_DURATION_SECS);
    }

    #[test]
    fn test_generate_and_validate_refresh_token() {
        let config = JwtConfig::new(SECRET);

        let result = config.generate_refresh_token("user-123", None).unwrap();

        assert_eq!(result.duration, REFRESH_TOKEN_DURATION_SECS);
        assert!(!result.jti.is_empty());
        assert_eq!(
            result.expires_at,
            result.issued_at + REFRESH_TOKEN_DURATION_SECS
        );

        let claims = config.validate_refresh_token(&result.token).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.email, None);
        assert_eq!(claims.token_type, TokenType::Refresh);
        assert_eq!(claims.jti, result.jti);
    }

    #[test]
    fn test_wrong_token_type_rejected() {
        let config = JwtConfig::new(SECRET);

        let access = config.generate_access_token("user-123", None).unwrap();
        let refresh = config.generate_refresh_token("user-123", None).unwrap();

        // An access token has no jti claim, so refresh validation fails
        // either at deserialization or at the type check.
        assert!(matches!(
            config.validate_refresh_token(&access.token),
            Err(JwtError::Malformed | JwtError::WrongTokenType)
        ));
        assert!(matches!(
            config.validate_access_token(&refresh.token),
            Err(JwtError::WrongTokenType)
        ));
    }

    #[test]
    fn test_malformed_token() {
        let config = JwtConfig::new(SECRET);

        assert!(matches!(
            config.validate_access_token("not-a-jwt"),
            Err(JwtError::Malformed)
        ));
    }

    #[test]
    fn test_wrong_secret_is_bad_signature() {
        let config1 = JwtConfig::new(b"secret-one-that-is-long-enough-32");
        let config2 = JwtConfig::new(b"secret-two-that-is-long-enough-32");

        let result = config1.generate_access_token("user-123", None).unwrap();

        assert!(matches!(
            config2.validate_access_token(&result.token),
            Err(JwtError::BadSignature)
        ));
    }

    #[test]
    fn test_expired_token() {
        let encoding_key = jsonwebtoken::EncodingKey::from_secret(SECRET);

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        // Claims with exp in the past
        let claims = AccessClaims {
            sub: "user-123".to_string(),
            email: None,
            token_type: TokenType::Access,
            iat: now - 100,
            exp: now - 50,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &encoding_key).unwrap();

        let config = JwtConfig::new(SECRET);
        assert!(matches!(
            config.validate_access_token(&token),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_foreign_algorithm_rejected() {
        let config = JwtConfig::new(SECRET);

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let claims = AccessClaims {
            sub: "user-123".to_string(),
            email: None,
            token_type: TokenType::Access,
            iat: now,
            exp: now + 300,
        };

        // Sign with HS384 - pinned HS256 validation must reject it
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(config.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_unique_jti_per_refresh_token() {
        let config = JwtConfig::new(SECRET);

        let result1 = config.generate_refresh_token("user-123", None).unwrap();
        let result2 = config.generate_refresh_token("user-123", None).unwrap();

        assert_ne!(
            result1.jti, result2.jti,
            "Each refresh token should have a unique jti"
        );
    }
}
