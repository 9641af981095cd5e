//! In-memory revocation store, the default and test implementation.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use super::{RegistryError, RevocationRegistry};

/// Mutex-guarded map of revoked JTI -> token expiry.
///
/// The lock is never held across an await point, so holding a std mutex
/// inside async handlers is fine.
#[derive(Default)]
pub struct MemoryRegistry {
    revoked: Mutex<HashMap<String, u64>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, u64>>, RegistryError> {
        self.revoked
            .lock()
            .map_err(|_| RegistryError::Storage("revocation set mutex poisoned".to_string()))
    }
}

#[async_trait]
impl RevocationRegistry for MemoryRegistry {
    async fn revoke(&self, jti: &str, expires_at: u64) -> Result<(), RegistryError> {
        self.lock()?.insert(jti.to_string(), expires_at);
        Ok(())
    }

    async fn revoke_if_active(&self, jti: &str, expires_at: u64) -> Result<bool, RegistryError> {
        let mut revoked = self.lock()?;
        if revoked.contains_key(jti) {
            return Ok(false);
        }
        revoked.insert(jti.to_string(), expires_at);
        Ok(true)
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, RegistryError> {
        Ok(self.lock()?.contains_key(jti))
    }

    async fn prune_expired(&self) -> Result<u64, RegistryError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut revoked = self.lock()?;
        let before = revoked.len();
        revoked.retain(|_, expires_at| *expires_at > now);
        Ok((before - revoked.len()) as u64)
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAR_FUTURE: u64 = u64::MAX;

    #[tokio::test]
    async fn test_revoke_and_check() {
        let registry = MemoryRegistry::new();

        assert!(!registry.is_revoked("jti-1").await.unwrap());
        registry.revoke("jti-1", FAR_FUTURE).await.unwrap();
        assert!(registry.is_revoked("jti-1").await.unwrap());
        assert!(!registry.is_revoked("jti-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_if_active_first_wins() {
        let registry = MemoryRegistry::new();

        assert!(registry.revoke_if_active("jti-1", FAR_FUTURE).await.unwrap());
        assert!(!registry.revoke_if_active("jti-1", FAR_FUTURE).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_revoke_if_active_single_winner() {
        use std::sync::Arc;

        let registry = Arc::new(MemoryRegistry::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry.revoke_if_active("jti-race", FAR_FUTURE).await.unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1, "exactly one revocation attempt should win");
    }

    #[tokio::test]
    async fn test_prune_expired() {
        let registry = MemoryRegistry::new();

        registry.revoke("dead", 1).await.unwrap();
        registry.revoke("alive", FAR_FUTURE).await.unwrap();

        let pruned = registry.prune_expired().await.unwrap();
        assert_eq!(pruned, 1);
        assert!(!registry.is_revoked("dead").await.unwrap());
        assert!(registry.is_revoked("alive").await.unwrap());
    }
}
