//! Tests for `sweeper` module

#[cfg(test)]
mod tests {
    use crate::cache::LruCache;
    use crate::shutdown::ShutdownFlag;
    use crate::sweeper::spawn_sweeper;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn sweeper_removes_expired_entries_and_reports_count() {
        let cache: Arc<LruCache<String, String>> = Arc::new(LruCache::new(10));
        cache.set("a".into(), "1".into(), Some(Duration::from_millis(1)));
        cache.set("b".into(), "2".into(), Some(Duration::from_secs(60)));

        let shutdown = ShutdownFlag::new();
        let removed_total = Arc::new(AtomicUsize::new(0));
        let removed_total_clone = Arc::clone(&removed_total);

        let handle = spawn_sweeper(
            Arc::clone(&cache),
            Duration::from_millis(10),
            shutdown.clone(),
            move |removed| {
                removed_total_clone.fetch_add(removed, Ordering::SeqCst);
            },
        );

        tokio::time::advance(Duration::from_millis(15)).await;
        tokio::task::yield_now().await;

        shutdown.request();
        tokio::time::advance(Duration::from_millis(15)).await;
        handle.join().await;

        assert!(removed_total.load(Ordering::SeqCst) >= 1);
        assert_eq!(cache.size(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_stops_promptly_on_shutdown() {
        let cache: Arc<LruCache<String, String>> = Arc::new(LruCache::new(10));
        let shutdown = ShutdownFlag::new();
        shutdown.request();

        let handle = spawn_sweeper(cache, Duration::from_millis(5), shutdown, |_| {});

        tokio::time::advance(Duration::from_millis(10)).await;
        handle.join().await;
    }
}
