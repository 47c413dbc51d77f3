//! Saved-filter lists and filter groups per user and table.
//!
//! Two independent maps share the `userId:tableId` key: the flat list of a
//! user's saved filters and the grouped view. The grouped view drops filters
//! of "Users" groups that point at inactive users. That check runs when the
//! entry is populated and its result stays in the cache until the entry
//! expires or the cache is cleared, which is why the user write path clears
//! this cache when an `active` flag changes.

use std::collections::HashSet;
use std::sync::Arc;

use intranet_core::{FilterGroup, SavedFilter, TableId, UserId};
use intranet_storage::{FilterRepository, StorageError, UserRepository};

use crate::config::CachePolicy;
use crate::error::CacheError;
use crate::keys::FilterListKey;
use crate::registry::CleanupTarget;
use crate::stats::CacheStats;
use crate::ttl::TtlCache;

pub const FILTER_LIST_CACHE: &str = "filter-list";

pub struct FilterListCache {
    filters: TtlCache<FilterListKey, Arc<[SavedFilter]>>,
    groups: TtlCache<FilterListKey, Arc<[FilterGroup]>>,
    filter_repository: Arc<dyn FilterRepository>,
    user_repository: Arc<dyn UserRepository>,
}

impl FilterListCache {
    pub fn new(
        filter_repository: Arc<dyn FilterRepository>,
        user_repository: Arc<dyn UserRepository>,
        policy: &CachePolicy,
    ) -> Self {
        Self {
            filters: TtlCache::from_policy(format!("{FILTER_LIST_CACHE}.filters"), policy),
            groups: TtlCache::from_policy(format!("{FILTER_LIST_CACHE}.groups"), policy),
            filter_repository,
            user_repository,
        }
    }

    /// All saved filters of the user for the table. An empty list is a valid
    /// (cached) result; `None` means the lookup failed.
    pub async fn get_filters(
        &self,
        user_id: UserId,
        table_id: &TableId,
    ) -> Option<Arc<[SavedFilter]>> {
        let key = FilterListKey::new(user_id, table_id.clone());
        self.filters
            .get_or_fetch(key, || async move {
                self.filter_repository
                    .find_saved_filters(user_id, table_id)
                    .await
                    .map(|filters| Some(Arc::from(filters)))
            })
            .await
    }

    /// Filter groups of the user for the table, "Users" groups reduced to
    /// filters that still reference an active user.
    pub async fn get_filter_groups(
        &self,
        user_id: UserId,
        table_id: &TableId,
    ) -> Option<Arc<[FilterGroup]>> {
        let key = FilterListKey::new(user_id, table_id.clone());
        self.groups
            .get_or_fetch(key, || async move {
                self.load_groups(user_id, table_id)
                    .await
                    .map(|groups| Some(Arc::from(groups)))
            })
            .await
    }

    async fn load_groups(
        &self,
        user_id: UserId,
        table_id: &TableId,
    ) -> Result<Vec<FilterGroup>, StorageError> {
        let mut groups = self
            .filter_repository
            .find_filter_groups(user_id, table_id)
            .await?;

        let mut referenced: Vec<UserId> = groups
            .iter()
            .filter(|group| group.is_user_group())
            .flat_map(FilterGroup::referenced_user_ids)
            .collect();
        if referenced.is_empty() {
            return Ok(groups);
        }
        referenced.sort_unstable();
        referenced.dedup();

        let active: HashSet<UserId> = self
            .user_repository
            .find_active_user_ids(&referenced)
            .await?;
        for group in groups.iter_mut().filter(|group| group.is_user_group()) {
            if !group.referenced_user_ids().is_empty() {
                group.retain_active_users(&active);
            }
        }
        Ok(groups)
    }

    /// Drops both cached views for the user and table.
    pub fn invalidate(&self, user_id: UserId, table_id: &TableId) {
        let key = FilterListKey::new(user_id, table_id.clone());
        self.filters.invalidate(&key);
        self.groups.invalidate(&key);
    }

    pub fn clear(&self) {
        self.filters.clear();
        self.groups.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.filters.stats() + self.groups.stats()
    }
}

impl CleanupTarget for FilterListCache {
    fn name(&self) -> &str {
        FILTER_LIST_CACHE
    }

    fn cleanup(&self) -> Result<usize, CacheError> {
        Ok(self.filters.cleanup() + self.groups.cleanup())
    }

    fn stats(&self) -> CacheStats {
        FilterListCache::stats(self)
    }

    fn clear(&self) {
        FilterListCache::clear(self);
    }
}
