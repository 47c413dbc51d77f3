//! User records with roles, permissions and branches.

use std::sync::Arc;

use intranet_core::{User, UserId};
use intranet_storage::UserRepository;

use crate::config::CachePolicy;
use crate::stats::CacheStats;
use crate::ttl::TtlCache;

pub const USER_CACHE: &str = "user";

/// Caches [`User`] records by id. Read on every authenticated request.
pub struct UserCache {
    inner: TtlCache<UserId, Arc<User>>,
    repository: Arc<dyn UserRepository>,
}

impl UserCache {
    pub fn new(repository: Arc<dyn UserRepository>, policy: &CachePolicy) -> Self {
        Self {
            inner: TtlCache::from_policy(USER_CACHE, policy),
            repository,
        }
    }

    /// Returns the user, loading it on a miss. `None` if the user does not
    /// exist or the lookup failed.
    pub async fn get(&self, user_id: UserId) -> Option<Arc<User>> {
        self.inner
            .get_or_fetch(user_id, || async move {
                self.repository
                    .find_user(user_id)
                    .await
                    .map(|user| user.map(Arc::new))
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

delegate_cleanup_target!(UserCache, inner);
