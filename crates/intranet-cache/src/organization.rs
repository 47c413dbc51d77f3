use std::sync::Arc;

use intranet_core::{OrganizationContext, UserId};
use intranet_storage::OrganizationRepository;

use crate::config::CachePolicy;
use crate::stats::CacheStats;
use crate::ttl::TtlCache;

pub const ORGANIZATION_CACHE: &str = "organization";

/// Caches the organization of a user's active role, keyed by user id.
pub struct OrganizationCache {
    inner: TtlCache<UserId, Arc<OrganizationContext>>,
    repository: Arc<dyn OrganizationRepository>,
}

impl OrganizationCache {
    pub fn new(repository: Arc<dyn OrganizationRepository>, policy: &CachePolicy) -> Self {
        Self {
            inner: TtlCache::from_policy(ORGANIZATION_CACHE, policy),
            repository,
        }
    }

    pub async fn get(&self, user_id: UserId) -> Option<Arc<OrganizationContext>> {
        self.inner
            .get_or_fetch(user_id, || async move {
                self.repository
                    .find_active_organization(user_id)
                    .await
                    .map(|context| context.map(Arc::new))
            })
            .await
    }

    pub fn invalidate(&self, user_id: UserId) {
        self.inner.invalidate(&user_id);
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }
}

delegate_cleanup_target!(OrganizationCache, inner);
