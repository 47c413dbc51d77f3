use std::sync::Arc;

use intranet_core::Branch;
use intranet_storage::BranchRepository;

use crate::config::CachePolicy;
use crate::keys::BranchKey;
use crate::stats::CacheStats;
use crate::ttl::TtlCache;

pub const BRANCH_CACHE: &str = "branch";

/// Caches the active branch per `(user, organization, role)`.
///
/// Role switches move users between organizations, so the write path clears
/// this cache wholesale instead of guessing which tuples went stale.
pub struct BranchCache {
    inner: TtlCache<BranchKey, Arc<Branch>>,
    repository: Arc<dyn BranchRepository>,
}

impl BranchCache {
    pub fn new(repository: Arc<dyn BranchRepository>, policy: &CachePolicy) -> Self {
        Self {
            inner: TtlCache::from_policy(BRANCH_CACHE, policy),
            repository,
        }
    }

    pub async fn get(&self, key: BranchKey) -> Option<Arc<Branch>> {
        self.inner
            .get_or_fetch(key, || async move {
                self.repository
                    .find_active_branch(key.user_id, key.organization_id, key.role_id)
                    .await
                    .map(|branch| branch.map(Arc::new))
            })
            .await
    }

    pub fn invalidate(&self, key: &BranchKey) {
        self.inner.invalidate(key);
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }
}

delegate_cleanup_target!(BranchCache, inner);
