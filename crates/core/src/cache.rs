use crate::settings::CacheSettings;
use crate::{CategoryOption, SearchError};
use moka::future::Cache;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Read-through cache for the search page's category facet list.
#[derive(Clone)]
pub struct CategoryOptionsCache {
    inner: Cache<String, Arc<Vec<CategoryOption>>>,
}

impl CategoryOptionsCache {
    pub fn new(settings: &CacheSettings) -> Self {
        let inner = Cache::builder()
            .max_capacity(settings.max_capacity)
            .time_to_live(Duration::from_secs(settings.ttl_secs))
            .build();
        Self { inner }
    }

    /// Returns the cached list for `key`, running `compute` on a miss.
    /// Concurrent misses on one key share a single computation; a failed
    /// computation is not cached. Waiters on a shared computation receive
    /// whatever error it ends with, including the first caller's cancellation.
    pub async fn get_or_compute<F>(&self, key: String, compute: F) -> Result<Arc<Vec<CategoryOption>>, SearchError>
    where
        F: Future<Output = Result<Vec<CategoryOption>, SearchError>>,
    {
        self.inner
            .try_get_with(key, async move { compute.await.map(Arc::new) })
            .await
            .map_err(SearchError::from_shared)
    }

    pub async fn invalidate_all(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
    }
}
