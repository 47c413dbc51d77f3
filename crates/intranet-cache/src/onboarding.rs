use std::sync::Arc;

use intranet_core::{OnboardingStatus, UserId};
use intranet_storage::OnboardingRepository;

use crate::config::CachePolicy;
use crate::stats::CacheStats;
use crate::ttl::TtlCache;

pub const ONBOARDING_CACHE: &str = "onboarding";

pub struct OnboardingCache {
    inner: TtlCache<UserId, Arc<OnboardingStatus>>,
    repository: Arc<dyn OnboardingRepository>,
}

impl OnboardingCache {
    pub fn new(repository: Arc<dyn OnboardingRepository>, policy: &CachePolicy) -> Self {
        Self {
            inner: TtlCache::from_policy(ONBOARDING_CACHE, policy),
            repository,
        }
    }

    pub async fn get(&self, user_id: UserId) -> Option<Arc<OnboardingStatus>> {
        self.inner
            .get_or_fetch(user_id, || async move {
                self.repository
                    .find_onboarding_status(user_id)
                    .await
                    .map(|status| status.map(Arc::new))
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

delegate_cleanup_target!(OnboardingCache, inner);
