//! Background sweeper: periodically scans the cache for expired entries
//! and gives the caller a chance to trigger a snapshot.
//!
//! Polls the shared [`ShutdownFlag`](crate::shutdown::ShutdownFlag)
//! between ticks so shutdown stays cooperative — an in-flight sweep
//! always finishes.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::LruCache;
use crate::shutdown::ShutdownFlag;

/// Handle to a running sweeper task.
pub struct SweeperHandle {
    join: tokio::task::JoinHandle<()>,
}

impl SweeperHandle {
    /// Waits for the sweeper task to stop (after shutdown is requested).
    ///
    /// # Panics
    ///
    /// Panics if the sweeper task itself panicked.
    pub async fn join(self) {
        self.join.await.expect("sweeper task panicked");
    }
}

/// Spawns a task that calls [`LruCache::cleanup_expired`] every
/// `interval`, invoking `on_sweep` with the number of entries removed
/// after each pass. Stops once `shutdown` is requested.
pub fn spawn_sweeper<K, V, F>(
    cache: Arc<LruCache<K, V>>,
    interval: Duration,
    shutdown: ShutdownFlag,
    mut on_sweep: F,
) -> SweeperHandle
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    F: FnMut(usize) + Send + 'static,
{
    let join = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if shutdown.is_requested() {
                break;
            }

            let removed = cache.cleanup_expired();
            tracing::debug!(removed, "sweeper pass complete");
            on_sweep(removed);

            if shutdown.is_requested() {
                break;
            }
        }
        tracing::info!("sweeper stopped");
    });

    SweeperHandle { join }
}

#[cfg(test)]
#[path = "sweeper_tests.rs"]
mod tests;
