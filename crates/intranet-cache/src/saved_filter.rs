use std::sync::Arc;

use intranet_core::{FilterId, SavedFilter};
use intranet_storage::FilterRepository;

use crate::config::CachePolicy;
use crate::stats::CacheStats;
use crate::ttl::TtlCache;

pub const SAVED_FILTER_CACHE: &str = "saved-filter";

/// Caches single saved filters by id, as applied by the listing endpoints.
pub struct SavedFilterCache {
    inner: TtlCache<FilterId, Arc<SavedFilter>>,
    repository: Arc<dyn FilterRepository>,
}

impl SavedFilterCache {
    pub fn new(repository: Arc<dyn FilterRepository>, policy: &CachePolicy) -> Self {
        Self {
            inner: TtlCache::from_policy(SAVED_FILTER_CACHE, policy),
            repository,
        }
    }

    pub async fn get(&self, filter_id: FilterId) -> Option<Arc<SavedFilter>> {
        self.inner
            .get_or_fetch(filter_id, || async move {
                self.repository
                    .find_saved_filter(filter_id)
                    .await
                    .map(|filter| filter.map(Arc::new))
            })
            .await
    }

    pub fn invalidate(&self, filter_id: FilterId) {
        self.inner.invalidate(&filter_id);
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }
}

delegate_cleanup_target!(SavedFilterCache, inner);
