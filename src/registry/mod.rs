//! Revoked refresh-token tracking.
//!
//! Rotation and logout burn a refresh token's JTI here; a burned JTI never
//! again authorizes a rotation, even while its signature and expiry are
//! still valid. The store is behind a trait so the in-memory default can
//! be swapped for the durable SQLite implementation without touching
//! callers.

mod memory;
mod sqlite;

pub use memory::MemoryRegistry;
pub use sqlite::SqliteRegistry;

use async_trait::async_trait;

/// Shared revocation store for refresh-token JTIs.
///
/// The only shared mutable state in the subsystem; implementations must be
/// safe under concurrent reads and writes from in-flight requests.
#[async_trait]
pub trait RevocationRegistry: Send + Sync {
    /// Mark a JTI as revoked. Idempotent.
    /// `expires_at` is the token's own expiry, used for pruning.
    async fn revoke(&self, jti: &str, expires_at: u64) -> Result<(), RegistryError>;

    /// Atomically revoke a JTI if it has not been revoked yet.
    ///
    /// Returns true iff this call performed the revocation. Under two
    /// concurrent rotations of the same refresh token, exactly one caller
    /// sees true; the single-use invariant rests on this.
    async fn revoke_if_active(&self, jti: &str, expires_at: u64) -> Result<bool, RegistryError>;

    /// Whether a JTI has been revoked.
    async fn is_revoked(&self, jti: &str) -> Result<bool, RegistryError>;

    /// Remove entries whose token expiry has passed. Returns the count
    /// removed. Expired tokens fail signature validation anyway, so their
    /// registry entries only waste space.
    async fn prune_expired(&self) -> Result<u64, RegistryError>;

    /// Release underlying resources. The registry must not be used after.
    async fn close(&self);
}

/// Errors from the revocation store.
#[derive(Debug)]
pub enum RegistryError {
    /// Underlying storage failure
    Storage(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::Storage(msg) => write!(f, "Registry storage error: {}", msg),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<sqlx::Error> for RegistryError {
    fn from(e: sqlx::Error) -> Self {
        RegistryError::Storage(e.to_string())
    }
}
