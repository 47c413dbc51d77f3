//! Repository traits for the persistence collaborator.
//!
//! Read methods return `Ok(None)` (or an empty list) for missing rows and
//! reserve `Err` for infrastructure failures. Write methods return the row as
//! it is after the write.

use std::collections::HashSet;

use async_trait::async_trait;
use intranet_core::{
    Branch, BranchId, FilterGroup, FilterId, LanguagePreference, NotificationSettings,
    OnboardingProgress, OnboardingStatus, OrganizationContext, OrganizationId, RoleId,
    SavedFilter, SavedFilterDraft, TableId, User, UserId, UserUpdate,
};

use crate::error::StorageError;

/// Users, their role/branch assignments and language settings.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Loads a user with roles (including permissions) and branches.
    async fn find_user(&self, user_id: UserId) -> Result<Option<User>, StorageError>;

    /// Loads the language fields needed to resolve the UI language.
    async fn find_language(
        &self,
        user_id: UserId,
    ) -> Result<Option<LanguagePreference>, StorageError>;

    /// Returns the subset of `user_ids` that belong to active users.
    async fn find_active_user_ids(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashSet<UserId>, StorageError>;

    /// Applies a profile/admin update.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user does not exist.
    async fn update_user(&self, user_id: UserId, update: &UserUpdate)
    -> Result<User, StorageError>;

    /// Makes `role_id` the user's last used role and re-selects the active
    /// branch inside the role's organization.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidOperation` if the role is not assigned
    /// to the user.
    async fn switch_role(&self, user_id: UserId, role_id: RoleId) -> Result<User, StorageError>;

    /// Replaces the user's role assignments.
    async fn set_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> Result<User, StorageError>;

    /// Replaces the user's branch assignments.
    async fn set_branches(
        &self,
        user_id: UserId,
        branch_ids: &[BranchId],
    ) -> Result<User, StorageError>;
}

/// Organization lookups scoped to a user.
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Resolves the organization of the user's last used role.
    async fn find_active_organization(
        &self,
        user_id: UserId,
    ) -> Result<Option<OrganizationContext>, StorageError>;
}

/// Branch lookups scoped to a user, organization and role.
#[async_trait]
pub trait BranchRepository: Send + Sync {
    /// Resolves the user's active branch inside `organization_id`.
    ///
    /// Returns `None` if the user does not hold `role_id` in that organization.
    async fn find_active_branch(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        role_id: RoleId,
    ) -> Result<Option<Branch>, StorageError>;
}

#[async_trait]
pub trait OnboardingRepository: Send + Sync {
    async fn find_onboarding_status(
        &self,
        user_id: UserId,
    ) -> Result<Option<OnboardingStatus>, StorageError>;

    async fn update_onboarding_progress(
        &self,
        user_id: UserId,
        progress: &OnboardingProgress,
    ) -> Result<OnboardingStatus, StorageError>;

    async fn complete_onboarding(&self, user_id: UserId) -> Result<OnboardingStatus, StorageError>;
}

/// Saved filters and filter groups.
#[async_trait]
pub trait FilterRepository: Send + Sync {
    /// All saved filters of a user for a table.
    async fn find_saved_filters(
        &self,
        user_id: UserId,
        table_id: &TableId,
    ) -> Result<Vec<SavedFilter>, StorageError>;

    /// Filter groups of a user for a table, ordered by `order`, each with its
    /// filters ordered by `order`.
    async fn find_filter_groups(
        &self,
        user_id: UserId,
        table_id: &TableId,
    ) -> Result<Vec<FilterGroup>, StorageError>;

    async fn find_saved_filter(
        &self,
        filter_id: FilterId,
    ) -> Result<Option<SavedFilter>, StorageError>;

    /// Creates the filter, or updates it when `draft.id` is set.
    async fn save_filter(&self, draft: &SavedFilterDraft) -> Result<SavedFilter, StorageError>;

    /// Deletes a filter and returns the deleted row.
    async fn delete_filter(&self, filter_id: FilterId) -> Result<SavedFilter, StorageError>;
}

#[async_trait]
pub trait NotificationSettingsRepository: Send + Sync {
    async fn find_user_settings(
        &self,
        user_id: UserId,
    ) -> Result<Option<NotificationSettings>, StorageError>;

    async fn find_system_settings(&self) -> Result<Option<NotificationSettings>, StorageError>;

    async fn update_user_settings(
        &self,
        user_id: UserId,
        settings: &NotificationSettings,
    ) -> Result<NotificationSettings, StorageError>;

    async fn update_system_settings(
        &self,
        settings: &NotificationSettings,
    ) -> Result<NotificationSettings, StorageError>;
}
