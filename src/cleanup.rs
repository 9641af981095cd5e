//! Scheduled pruning of expired revocation entries.
//!
//! Without pruning the revocation set grows for every rotation and logout
//! ever performed; entries are safe to drop once the token they block has
//! expired on its own.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::registry::RevocationRegistry;

/// Interval between cleanup runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60); // 1 hour

/// Run the cleanup once.
pub async fn run_cleanup(registry: &Arc<dyn RevocationRegistry>) {
    match registry.prune_expired().await {
        Ok(count) if count > 0 => info!("Pruned {} expired revocation entries", count),
        Ok(_) => {}
        Err(e) => error!("Failed to prune revocation registry: {}", e),
    }
}

/// Spawn a background task that prunes periodically.
/// Returns a handle that can be used to abort the task.
pub fn spawn_cleanup_scheduler(registry: Arc<dyn RevocationRegistry>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

        loop {
            interval.tick().await;
            run_cleanup(&registry).await;
        }
    })
}
