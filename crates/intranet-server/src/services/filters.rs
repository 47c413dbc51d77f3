use std::sync::Arc;

use intranet_cache::CacheLayer;
use intranet_core::{FilterGroup, FilterId, SavedFilter, SavedFilterDraft, TableId, UserId};
use intranet_storage::FilterRepository;

use crate::error::ServiceError;

/// Saved filters and filter groups.
///
/// Every write drops the `(user, table)` filter lists it touched and the
/// saved-filter entry of the filter itself.
pub struct FilterService {
    repository: Arc<dyn FilterRepository>,
    caches: Arc<CacheLayer>,
}

impl FilterService {
    pub fn new(repository: Arc<dyn FilterRepository>, caches: Arc<CacheLayer>) -> Self {
        Self { repository, caches }
    }

    /// An empty list is a valid result; `Unavailable` means the backend failed.
    pub async fn list(
        &self,
        user_id: UserId,
        table_id: &TableId,
    ) -> Result<Arc<[SavedFilter]>, ServiceError> {
        self.caches
            .filter_lists
            .get_filters(user_id, table_id)
            .await
            .ok_or_else(|| load_failed("filter list", user_id, table_id))
    }

    pub async fn groups(
        &self,
        user_id: UserId,
        table_id: &TableId,
    ) -> Result<Arc<[FilterGroup]>, ServiceError> {
        self.caches
            .filter_lists
            .get_filter_groups(user_id, table_id)
            .await
            .ok_or_else(|| load_failed("filter groups", user_id, table_id))
    }

    pub async fn get(&self, filter_id: FilterId) -> Result<Arc<SavedFilter>, ServiceError> {
        self.caches
            .saved_filters
            .get(filter_id)
            .await
            .ok_or_else(|| ServiceError::not_found("SavedFilter", filter_id))
    }

    /// Creates a filter, or updates it when `draft.id` is set.
    pub async fn save(&self, draft: &SavedFilterDraft) -> Result<SavedFilter, ServiceError> {
        if draft.name.trim().is_empty() {
            return Err(ServiceError::bad_request("filter name must not be empty"));
        }
        // An update may move the filter to another table; both lists go stale.
        let previous = match draft.id {
            Some(id) => self.repository.find_saved_filter(id).await?,
            None => None,
        };

        let saved = self.repository.save_filter(draft).await?;

        if let Some(previous) = previous {
            self.caches
                .filter_lists
                .invalidate(previous.user_id, &previous.table_id);
        }
        self.caches
            .filter_lists
            .invalidate(saved.user_id, &saved.table_id);
        self.caches.saved_filters.invalidate(saved.id);
        Ok(saved)
    }

    pub async fn delete(&self, filter_id: FilterId) -> Result<SavedFilter, ServiceError> {
        let deleted = self.repository.delete_filter(filter_id).await?;
        self.caches
            .filter_lists
            .invalidate(deleted.user_id, &deleted.table_id);
        self.caches.saved_filters.invalidate(filter_id);
        Ok(deleted)
    }
}

fn load_failed(what: &str, user_id: UserId, table_id: &TableId) -> ServiceError {
    ServiceError::unavailable(format!("{what} {user_id}:{table_id} could not be loaded"))
}
