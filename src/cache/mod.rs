use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::config::CacheConfig;
use crate::models::services::Service;

/// Cache keys
pub mod keys {
    /// The unfiltered, active-only service listing.
    pub const ALL_SERVICES: &str = "services:all";
}

/// Single-slot memoization of the unfiltered service catalog.
///
/// Concurrent callers that miss share one in-flight fetch. A failed fetch is
/// never stored: waiters get an empty list and the next call fetches again.
#[derive(Clone)]
pub struct ServiceCatalogCache {
    cache: Cache<&'static str, Arc<Vec<Service>>>,
}

impl ServiceCatalogCache {
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { cache }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.services_ttl)
    }

    /// Return the cached catalog or run `fetch` to fill it.
    pub async fn get_or_fetch<F, E>(&self, fetch: F) -> Arc<Vec<Service>>
    where
        F: Future<Output = Result<Vec<Service>, E>>,
        E: Display + Send + Sync + 'static,
    {
        if let Some(hit) = self.cache.get(keys::ALL_SERVICES).await {
            tracing::debug!(count = hit.len(), "service catalog cache hit");
            return hit;
        }

        let result = self
            .cache
            .try_get_with(keys::ALL_SERVICES, async move {
                tracing::debug!("service catalog cache miss, fetching");
                fetch.await.map(Arc::new)
            })
            .await;

        match result {
            Ok(services) => services,
            Err(e) => {
                tracing::warn!("Failed to load service catalog: {e}");
                Arc::new(Vec::new())
            }
        }
    }

    /// Drop the cached catalog so the next read goes to the store.
    pub async fn invalidate(&self) {
        self.cache.invalidate(keys::ALL_SERVICES).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn counted(calls: &AtomicUsize) -> Result<Vec<Service>, String> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    #[tokio::test]
    async fn second_read_within_ttl_is_served_from_cache() {
        let cache = ServiceCatalogCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);

        cache.get_or_fetch(counted(&calls)).await;
        cache.get_or_fetch(counted(&calls)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidation_forces_a_fresh_fetch() {
        let cache = ServiceCatalogCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);

        cache.get_or_fetch(counted(&calls)).await;
        cache.invalidate().await;
        cache.get_or_fetch(counted(&calls)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn expired_entry_is_fetched_exactly_once_more() {
        let cache = ServiceCatalogCache::new(Duration::from_millis(100));
        let calls = AtomicUsize::new(0);

        cache.get_or_fetch(counted(&calls)).await;
        tokio::time::sleep(Duration::from_millis(250)).await;
        cache.get_or_fetch(counted(&calls)).await;
        cache.get_or_fetch(counted(&calls)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_fetch() {
        let cache = ServiceCatalogCache::new(Duration::from_secs(300));
        let calls = Arc::new(AtomicUsize::new(0));

        let slow_fetch = |calls: Arc<AtomicUsize>| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, String>(Vec::new())
        };

        let (a, b) = tokio::join!(
            cache.get_or_fetch(slow_fetch(calls.clone())),
            cache.get_or_fetch(slow_fetch(calls.clone())),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn failed_fetch_yields_empty_and_is_not_cached() {
        let cache = ServiceCatalogCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);

        let failed = cache
            .get_or_fetch(async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<Vec<Service>, _>("store unavailable".to_string())
            })
            .await;
        assert!(failed.is_empty());

        cache.get_or_fetch(counted(&calls)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
