//! Expiry Sweep Task
//!
//! Background task that periodically reads every open namespace's index so
//! value records of expired keys are deleted even when nobody asks for them.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::registry::CacheRegistry;

/// Spawns a background task that periodically purges expired keys.
///
/// Each round calls `keys()` on every cache in the registry; reading the
/// index deletes the value records of expired entries as a side effect.
/// Failures are logged and the next round tries again.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let registry = Arc::new(CacheRegistry::new(store, Some(300)));
/// let sweep_handle = spawn_sweep_task(registry.clone(), 30);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(
    registry: Arc<CacheRegistry>,
    sweep_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            for cache in registry.caches().await {
                match cache.keys().await {
                    Ok(keys) => debug!(
                        "Expiry sweep: namespace '{}' has {} live keys",
                        cache.namespace(),
                        keys.len()
                    ),
                    Err(e) => warn!(
                        "Expiry sweep failed for namespace '{}': {}",
                        cache.namespace(),
                        e
                    ),
                }
            }
        }
    })
}
