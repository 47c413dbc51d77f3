use std::sync::Arc;

use intranet_core::{DEFAULT_LANGUAGE, UserId};
use intranet_storage::UserRepository;

use crate::config::CachePolicy;
use crate::stats::CacheStats;
use crate::ttl::TtlCache;

pub const USER_LANGUAGE_CACHE: &str = "user-language";

/// Caches the effective UI language of a user.
///
/// The stored value is already resolved: the user's own language, else the
/// default language of the organization of the active role, else
/// [`DEFAULT_LANGUAGE`]. Role changes therefore invalidate this cache too.
pub struct UserLanguageCache {
    inner: TtlCache<UserId, Arc<str>>,
    repository: Arc<dyn UserRepository>,
}

impl UserLanguageCache {
    pub fn new(repository: Arc<dyn UserRepository>, policy: &CachePolicy) -> Self {
        Self {
            inner: TtlCache::from_policy(USER_LANGUAGE_CACHE, policy),
            repository,
        }
    }

    pub async fn get(&self, user_id: UserId) -> Option<Arc<str>> {
        self.inner
            .get_or_fetch(user_id, || async move {
                self.repository.find_language(user_id).await.map(|found| {
                    found.map(|preference| Arc::from(preference.effective_language()))
                })
            })
            .await
    }

    /// Like [`get`](Self::get), falling back to [`DEFAULT_LANGUAGE`] when the
    /// user is unknown or the lookup failed.
    pub async fn language_or_default(&self, user_id: UserId) -> String {
        self.get(user_id)
            .await
            .map_or_else(|| DEFAULT_LANGUAGE.to_string(), |language| language.to_string())
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

delegate_cleanup_target!(UserLanguageCache, inner);
