use std::sync::Arc;

use intranet_cache::{BranchKey, CacheLayer};
use intranet_core::{
    Branch, BranchId, OrganizationContext, RoleId, User, UserId, UserUpdate,
};
use intranet_storage::UserRepository;
use tracing::info;

use crate::error::ServiceError;

pub struct UserService {
    repository: Arc<dyn UserRepository>,
    caches: Arc<CacheLayer>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, caches: Arc<CacheLayer>) -> Self {
        Self { repository, caches }
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<Arc<User>, ServiceError> {
        self.caches
            .users
            .get(user_id)
            .await
            .ok_or_else(|| ServiceError::not_found("User", user_id))
    }

    /// Effective UI language, `"de"` when unknown.
    pub async fn language(&self, user_id: UserId) -> String {
        self.caches.user_languages.language_or_default(user_id).await
    }

    pub async fn organization(
        &self,
        user_id: UserId,
    ) -> Result<Arc<OrganizationContext>, ServiceError> {
        self.caches
            .organizations
            .get(user_id)
            .await
            .ok_or_else(|| ServiceError::not_found("Organization", user_id))
    }

    /// The user's active branch within the organization of the active role.
    pub async fn active_branch(&self, user_id: UserId) -> Result<Option<Arc<Branch>>, ServiceError> {
        let context = self.organization(user_id).await?;
        let key = BranchKey::new(user_id, context.organization.id, context.role_id);
        Ok(self.caches.branches.get(key).await)
    }

    /// Profile/admin update.
    ///
    /// Always drops the cached user. A language change also drops the cached
    /// language; an `active` change clears all filter lists, since "Users"
    /// filter groups of every user may reference this one.
    pub async fn update_user(
        &self,
        user_id: UserId,
        update: &UserUpdate,
    ) -> Result<User, ServiceError> {
        if update.is_empty() {
            return Err(ServiceError::bad_request("update contains no fields"));
        }
        let user = self.repository.update_user(user_id, update).await?;

        self.caches.users.invalidate(user_id);
        if update.touches_language() {
            self.caches.user_languages.invalidate(user_id);
        }
        if update.touches_active() {
            self.caches.filter_lists.clear();
            info!(user_id = %user_id, active = user.active, "User active flag changed, filter lists cleared");
        }
        Ok(user)
    }

    /// Switches the active role, which may move the user to another
    /// organization and branch.
    pub async fn switch_role(&self, user_id: UserId, role_id: RoleId) -> Result<User, ServiceError> {
        let user = self.repository.switch_role(user_id, role_id).await?;

        self.caches.users.invalidate(user_id);
        self.caches.organizations.invalidate(user_id);
        self.caches.branches.clear();
        // The effective language falls back to the organization default.
        self.caches.user_languages.invalidate(user_id);
        Ok(user)
    }

    pub async fn set_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> Result<User, ServiceError> {
        let user = self.repository.set_roles(user_id, role_ids).await?;
        self.invalidate_assignments(user_id);
        Ok(user)
    }

    pub async fn set_branches(
        &self,
        user_id: UserId,
        branch_ids: &[BranchId],
    ) -> Result<User, ServiceError> {
        let user = self.repository.set_branches(user_id, branch_ids).await?;
        self.invalidate_assignments(user_id);
        Ok(user)
    }

    fn invalidate_assignments(&self, user_id: UserId) {
        self.caches.user_languages.invalidate(user_id);
        self.caches.users.invalidate(user_id);
    }
}
