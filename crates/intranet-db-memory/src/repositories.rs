use std::collections::HashSet;

use async_trait::async_trait;
use intranet_core::{
    Branch, BranchId, FilterGroup, FilterId, LanguagePreference, NotificationSettings,
    OnboardingProgress, OnboardingStatus, OrganizationContext, OrganizationId, RoleId,
    SavedFilter, SavedFilterDraft, TableId, User, UserId, UserUpdate, now_utc,
};
use intranet_storage::{
    BranchRepository, FilterRepository, NotificationSettingsRepository, OnboardingRepository,
    OrganizationRepository, StorageError, UserRepository,
};

use crate::storage::{Assignment, InMemoryStore, Operation, State};

fn built_user(state: &State, user_id: UserId) -> Result<User, StorageError> {
    state
        .build_user(user_id)
        .ok_or_else(|| StorageError::not_found("User", user_id))
}

/// Keeps `previous` as last used if it survives the replacement, otherwise
/// promotes the first new assignment.
fn replace_assignments<T: Copy + PartialEq>(
    assignments: &mut Vec<Assignment<T>>,
    user_id: UserId,
    targets: &[T],
    touched: u64,
) {
    let previous = assignments
        .iter()
        .find(|a| a.user_id == user_id && a.last_used)
        .map(|a| a.target);
    assignments.retain(|a| a.user_id != user_id);

    let keep_previous = previous.is_some_and(|p| targets.contains(&p));
    for (index, target) in targets.iter().copied().enumerate() {
        let last_used = if keep_previous {
            Some(target) == previous
        } else {
            index == 0
        };
        assignments.push(Assignment {
            user_id,
            target,
            last_used,
            touched,
        });
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_user(&self, user_id: UserId) -> Result<Option<User>, StorageError> {
        self.record(Operation::FindUser)?;
        Ok(self.state.read().build_user(user_id))
    }

    async fn find_language(
        &self,
        user_id: UserId,
    ) -> Result<Option<LanguagePreference>, StorageError> {
        self.record(Operation::FindLanguage)?;
        let state = self.state.read();
        let Some(row) = state.users.get(&user_id) else {
            return Ok(None);
        };
        let organization_language = state
            .active_role(user_id)
            .and_then(|role| role.organization_id)
            .and_then(|id| state.organizations.get(&id))
            .and_then(|org| org.default_language.clone());
        Ok(Some(LanguagePreference {
            user_language: row.seed.language.clone(),
            organization_language,
        }))
    }

    async fn find_active_user_ids(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashSet<UserId>, StorageError> {
        self.record(Operation::FindActiveUserIds)?;
        let state = self.state.read();
        Ok(user_ids
            .iter()
            .copied()
            .filter(|id| state.users.get(id).is_some_and(|row| row.seed.active))
            .collect())
    }

    async fn update_user(
        &self,
        user_id: UserId,
        update: &UserUpdate,
    ) -> Result<User, StorageError> {
        self.record(Operation::UpdateUser)?;
        let mut state = self.state.write();
        let row = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| StorageError::not_found("User", user_id))?;
        let seed = &mut row.seed;
        if let Some(username) = &update.username {
            seed.username = username.clone();
        }
        if let Some(email) = &update.email {
            seed.email = email.clone();
        }
        if let Some(first_name) = &update.first_name {
            seed.first_name = first_name.clone();
        }
        if let Some(last_name) = &update.last_name {
            seed.last_name = last_name.clone();
        }
        if let Some(language) = &update.language {
            seed.language = Some(language.clone());
        }
        if let Some(active) = update.active {
            seed.active = active;
        }
        built_user(&state, user_id)
    }

    async fn switch_role(&self, user_id: UserId, role_id: RoleId) -> Result<User, StorageError> {
        self.record(Operation::SwitchRole)?;
        let mut state = self.state.write();
        state.require_user(user_id)?;
        if !state
            .user_roles
            .iter()
            .any(|a| a.user_id == user_id && a.target == role_id)
        {
            return Err(StorageError::invalid_operation(format!(
                "role {role_id} is not assigned to user {user_id}"
            )));
        }
        let organization_id = state.roles.get(&role_id).and_then(|r| r.organization_id);

        let touched = state.tick();
        for assignment in state.user_roles.iter_mut().filter(|a| a.user_id == user_id) {
            assignment.last_used = assignment.target == role_id;
            if assignment.last_used {
                assignment.touched = touched;
            }
        }

        // The most recently used branch of the new organization becomes active.
        let candidate = state
            .user_branches
            .iter()
            .enumerate()
            .filter(|(_, a)| a.user_id == user_id)
            .filter(|(_, a)| {
                state
                    .branches
                    .get(&a.target)
                    .is_some_and(|b| Some(b.organization_id) == organization_id)
            })
            .max_by_key(|(_, a)| a.touched)
            .map(|(index, _)| index);
        for assignment in state
            .user_branches
            .iter_mut()
            .filter(|a| a.user_id == user_id)
        {
            assignment.last_used = false;
        }
        if let Some(index) = candidate {
            state.user_branches[index].last_used = true;
            state.user_branches[index].touched = touched;
        }

        built_user(&state, user_id)
    }

    async fn set_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> Result<User, StorageError> {
        self.record(Operation::SetRoles)?;
        let mut state = self.state.write();
        state.require_user(user_id)?;
        if let Some(missing) = role_ids.iter().find(|id| !state.roles.contains_key(*id)) {
            return Err(StorageError::not_found("Role", missing));
        }
        let touched = state.tick();
        replace_assignments(&mut state.user_roles, user_id, role_ids, touched);
        built_user(&state, user_id)
    }

    async fn set_branches(
        &self,
        user_id: UserId,
        branch_ids: &[BranchId],
    ) -> Result<User, StorageError> {
        self.record(Operation::SetBranches)?;
        let mut state = self.state.write();
        state.require_user(user_id)?;
        if let Some(missing) = branch_ids
            .iter()
            .find(|id| !state.branches.contains_key(*id))
        {
            return Err(StorageError::not_found("Branch", missing));
        }
        let touched = state.tick();
        replace_assignments(&mut state.user_branches, user_id, branch_ids, touched);
        built_user(&state, user_id)
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryStore {
    async fn find_active_organization(
        &self,
        user_id: UserId,
    ) -> Result<Option<OrganizationContext>, StorageError> {
        self.record(Operation::FindActiveOrganization)?;
        let state = self.state.read();
        let Some(role) = state.active_role(user_id) else {
            return Ok(None);
        };
        let Some(organization) = role
            .organization_id
            .and_then(|id| state.organizations.get(&id))
        else {
            return Ok(None);
        };
        Ok(Some(OrganizationContext {
            organization: organization.clone(),
            role_id: role.id,
            role_name: role.name.clone(),
        }))
    }
}

#[async_trait]
impl BranchRepository for InMemoryStore {
    async fn find_active_branch(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        role_id: RoleId,
    ) -> Result<Option<Branch>, StorageError> {
        self.record(Operation::FindActiveBranch)?;
        let state = self.state.read();
        let holds_role = state.user_roles.iter().any(|a| {
            a.user_id == user_id
                && a.target == role_id
                && state
                    .roles
                    .get(&role_id)
                    .is_some_and(|r| r.organization_id == Some(organization_id))
        });
        if !holds_role {
            return Ok(None);
        }
        Ok(state
            .user_branches
            .iter()
            .filter(|a| a.user_id == user_id && a.last_used)
            .filter_map(|a| state.branches.get(&a.target))
            .find(|b| b.organization_id == organization_id)
            .cloned())
    }
}

#[async_trait]
impl OnboardingRepository for InMemoryStore {
    async fn find_onboarding_status(
        &self,
        user_id: UserId,
    ) -> Result<Option<OnboardingStatus>, StorageError> {
        self.record(Operation::FindOnboardingStatus)?;
        Ok(self
            .state
            .read()
            .users
            .get(&user_id)
            .map(|row| row.onboarding.clone()))
    }

    async fn update_onboarding_progress(
        &self,
        user_id: UserId,
        progress: &OnboardingProgress,
    ) -> Result<OnboardingStatus, StorageError> {
        self.record(Operation::UpdateOnboardingProgress)?;
        let mut state = self.state.write();
        let row = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| StorageError::not_found("User", user_id))?;
        row.onboarding.progress = progress.clone();
        if row.onboarding.started_at.is_none() {
            row.onboarding.started_at = Some(now_utc());
        }
        Ok(row.onboarding.clone())
    }

    async fn complete_onboarding(&self, user_id: UserId) -> Result<OnboardingStatus, StorageError> {
        self.record(Operation::CompleteOnboarding)?;
        let mut state = self.state.write();
        let row = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| StorageError::not_found("User", user_id))?;
        let now = now_utc();
        row.onboarding.completed = true;
        row.onboarding.completed_at = Some(now);
        if row.onboarding.started_at.is_none() {
            row.onboarding.started_at = Some(now);
        }
        Ok(row.onboarding.clone())
    }
}

#[async_trait]
impl FilterRepository for InMemoryStore {
    async fn find_saved_filters(
        &self,
        user_id: UserId,
        table_id: &TableId,
    ) -> Result<Vec<SavedFilter>, StorageError> {
        self.record(Operation::FindSavedFilters)?;
        Ok(self
            .state
            .read()
            .filters
            .values()
            .filter(|f| f.user_id == user_id && &f.table_id == table_id)
            .cloned()
            .collect())
    }

    async fn find_filter_groups(
        &self,
        user_id: UserId,
        table_id: &TableId,
    ) -> Result<Vec<FilterGroup>, StorageError> {
        self.record(Operation::FindFilterGroups)?;
        let state = self.state.read();
        let mut groups: Vec<FilterGroup> = state
            .groups
            .values()
            .filter(|g| g.user_id == user_id && &g.table_id == table_id)
            .map(|g| {
                let mut filters: Vec<SavedFilter> = state
                    .filters
                    .values()
                    .filter(|f| f.group_id == Some(g.id))
                    .cloned()
                    .collect();
                filters.sort_by_key(|f| (f.order, f.id));
                FilterGroup {
                    id: g.id,
                    user_id: g.user_id,
                    table_id: g.table_id.clone(),
                    name: g.name.clone(),
                    order: g.order,
                    filters,
                }
            })
            .collect();
        groups.sort_by_key(|g| (g.order, g.id));
        Ok(groups)
    }

    async fn find_saved_filter(
        &self,
        filter_id: FilterId,
    ) -> Result<Option<SavedFilter>, StorageError> {
        self.record(Operation::FindSavedFilter)?;
        Ok(self.state.read().filters.get(&filter_id).cloned())
    }

    async fn save_filter(&self, draft: &SavedFilterDraft) -> Result<SavedFilter, StorageError> {
        self.record(Operation::SaveFilter)?;
        let mut state = self.state.write();
        state.require_user(draft.user_id)?;
        if let Some(group_id) = draft.group_id {
            let group_matches = state
                .groups
                .get(&group_id)
                .is_some_and(|g| g.user_id == draft.user_id && g.table_id == draft.table_id);
            if !group_matches {
                return Err(StorageError::invalid_operation(format!(
                    "filter group {group_id} does not belong to user {} and table {}",
                    draft.user_id, draft.table_id
                )));
            }
        }

        let now = now_utc();
        let (id, created_at) = match draft.id {
            Some(id) => {
                let existing = state
                    .filters
                    .get(&id)
                    .ok_or_else(|| StorageError::not_found("SavedFilter", id))?;
                (id, existing.created_at)
            }
            None => {
                let next = state.filters.keys().next_back().map_or(1, |id| id.get() + 1);
                (FilterId::new(next), now)
            }
        };

        let filter = SavedFilter {
            id,
            user_id: draft.user_id,
            table_id: draft.table_id.clone(),
            name: draft.name.clone(),
            conditions: draft.conditions.clone(),
            operators: draft.operators.clone(),
            sort_directions: draft.sort_directions.clone(),
            group_id: draft.group_id,
            order: draft.order,
            created_at,
            updated_at: now,
        };
        state.filters.insert(id, filter.clone());
        Ok(filter)
    }

    async fn delete_filter(&self, filter_id: FilterId) -> Result<SavedFilter, StorageError> {
        self.record(Operation::DeleteFilter)?;
        self.state
            .write()
            .filters
            .remove(&filter_id)
            .ok_or_else(|| StorageError::not_found("SavedFilter", filter_id))
    }
}

#[async_trait]
impl NotificationSettingsRepository for InMemoryStore {
    async fn find_user_settings(
        &self,
        user_id: UserId,
    ) -> Result<Option<NotificationSettings>, StorageError> {
        self.record(Operation::FindUserSettings)?;
        Ok(self.state.read().user_settings.get(&user_id).cloned())
    }

    async fn find_system_settings(&self) -> Result<Option<NotificationSettings>, StorageError> {
        self.record(Operation::FindSystemSettings)?;
        Ok(self.state.read().system_settings.clone())
    }

    async fn update_user_settings(
        &self,
        user_id: UserId,
        settings: &NotificationSettings,
    ) -> Result<NotificationSettings, StorageError> {
        self.record(Operation::UpdateUserSettings)?;
        let mut state = self.state.write();
        state.require_user(user_id)?;
        state.user_settings.insert(user_id, settings.clone());
        Ok(settings.clone())
    }

    async fn update_system_settings(
        &self,
        settings: &NotificationSettings,
    ) -> Result<NotificationSettings, StorageError> {
        self.record(Operation::UpdateSystemSettings)?;
        self.state.write().system_settings = Some(settings.clone());
        Ok(settings.clone())
    }
}
