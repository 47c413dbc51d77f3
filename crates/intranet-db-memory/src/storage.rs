use std::collections::{BTreeMap, HashMap};
use std::fmt;

use dashmap::DashMap;
use intranet_core::{
    Branch, BranchId, FilterGroupId, FilterId, NotificationSettings, OnboardingStatus,
    Organization, OrganizationId, Permission, RoleId, SavedFilter, TableId, User, UserBranch,
    UserId, UserRole,
};
use intranet_storage::StorageError;
use parking_lot::RwLock;

/// Repository calls tracked by [`InMemoryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FindUser,
    FindLanguage,
    FindActiveUserIds,
    UpdateUser,
    SwitchRole,
    SetRoles,
    SetBranches,
    FindActiveOrganization,
    FindActiveBranch,
    FindOnboardingStatus,
    UpdateOnboardingProgress,
    CompleteOnboarding,
    FindSavedFilters,
    FindFilterGroups,
    FindSavedFilter,
    SaveFilter,
    DeleteFilter,
    FindUserSettings,
    FindSystemSettings,
    UpdateUserSettings,
    UpdateSystemSettings,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A role row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub organization_id: Option<OrganizationId>,
    pub permissions: Vec<Permission>,
}

impl Role {
    pub fn new(id: i64, name: impl Into<String>, organization_id: Option<i64>) -> Self {
        Self {
            id: RoleId::new(id),
            name: name.into(),
            organization_id: organization_id.map(OrganizationId::new),
            permissions: Vec::new(),
        }
    }
}

/// Seed data for a user row.
#[derive(Debug, Clone)]
pub struct UserSeed {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub language: Option<String>,
    pub active: bool,
}

impl UserSeed {
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            id: UserId::new(id),
            email: format!("{username}@example.com"),
            first_name: username.clone(),
            last_name: String::new(),
            username,
            language: None,
            active: true,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct UserRow {
    pub(crate) seed: UserSeed,
    pub(crate) onboarding: OnboardingStatus,
}

#[derive(Debug, Clone)]
pub(crate) struct Assignment<T> {
    pub(crate) user_id: UserId,
    pub(crate) target: T,
    pub(crate) last_used: bool,
    /// Logical update time, used where the schema orders by `updatedAt`.
    pub(crate) touched: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct GroupRow {
    pub(crate) id: FilterGroupId,
    pub(crate) user_id: UserId,
    pub(crate) table_id: TableId,
    pub(crate) name: String,
    pub(crate) order: i32,
}

#[derive(Debug, Default)]
pub(crate) struct State {
    pub(crate) users: BTreeMap<UserId, UserRow>,
    pub(crate) organizations: BTreeMap<OrganizationId, Organization>,
    pub(crate) roles: BTreeMap<RoleId, Role>,
    pub(crate) branches: BTreeMap<BranchId, Branch>,
    pub(crate) user_roles: Vec<Assignment<RoleId>>,
    pub(crate) user_branches: Vec<Assignment<BranchId>>,
    pub(crate) filters: BTreeMap<FilterId, SavedFilter>,
    pub(crate) groups: BTreeMap<FilterGroupId, GroupRow>,
    pub(crate) user_settings: HashMap<UserId, NotificationSettings>,
    pub(crate) system_settings: Option<NotificationSettings>,
    pub(crate) clock: u64,
}

impl State {
    pub(crate) fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    pub(crate) fn build_user(&self, user_id: UserId) -> Option<User> {
        let row = self.users.get(&user_id)?;
        let roles = self
            .user_roles
            .iter()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| {
                let role = self.roles.get(&a.target)?;
                Some(UserRole {
                    role_id: role.id,
                    role_name: role.name.clone(),
                    organization_id: role.organization_id,
                    last_used: a.last_used,
                    permissions: role.permissions.clone(),
                })
            })
            .collect();
        let branches = self
            .user_branches
            .iter()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| {
                let branch = self.branches.get(&a.target)?;
                Some(UserBranch {
                    branch_id: branch.id,
                    branch_name: branch.name.clone(),
                    organization_id: branch.organization_id,
                    last_used: a.last_used,
                })
            })
            .collect();

        let seed = &row.seed;
        Some(User {
            id: seed.id,
            username: seed.username.clone(),
            email: seed.email.clone(),
            first_name: seed.first_name.clone(),
            last_name: seed.last_name.clone(),
            language: seed.language.clone(),
            active: seed.active,
            roles,
            branches,
        })
    }

    /// The role row of the user's last used role assignment.
    pub(crate) fn active_role(&self, user_id: UserId) -> Option<&Role> {
        self.user_roles
            .iter()
            .find(|a| a.user_id == user_id && a.last_used)
            .and_then(|a| self.roles.get(&a.target))
    }

    pub(crate) fn require_user(&self, user_id: UserId) -> Result<&UserRow, StorageError> {
        self.users
            .get(&user_id)
            .ok_or_else(|| StorageError::not_found("User", user_id))
    }
}

/// In-memory implementation of every repository trait in `intranet-storage`.
///
/// Besides serving as the development backend, the store counts calls per
/// [`Operation`] and can be told to fail an operation with a connection error,
/// which is how cache tests observe fetches and fetch failures.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub(crate) state: RwLock<State>,
    calls: DashMap<Operation, usize>,
    failing: DashMap<Operation, ()>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts the call and fails it if the operation is marked as failing.
    pub(crate) fn record(&self, operation: Operation) -> Result<(), StorageError> {
        *self.calls.entry(operation).or_insert(0) += 1;
        if self.failing.contains_key(&operation) {
            return Err(StorageError::connection_error(format!(
                "{operation} unavailable"
            )));
        }
        Ok(())
    }

    /// Number of calls made to `operation` so far, failed ones included.
    pub fn calls(&self, operation: Operation) -> usize {
        self.calls.get(&operation).map(|c| *c).unwrap_or(0)
    }

    pub fn reset_calls(&self) {
        self.calls.clear();
    }

    /// Makes every following call to `operation` fail (or succeed again).
    pub fn set_failing(&self, operation: Operation, failing: bool) {
        if failing {
            self.failing.insert(operation, ());
        } else {
            self.failing.remove(&operation);
        }
    }

    // ==================== Seeding ====================

    pub fn insert_user(&self, seed: UserSeed) {
        let mut state = self.state.write();
        state.users.insert(
            seed.id,
            UserRow {
                seed,
                onboarding: OnboardingStatus::default(),
            },
        );
    }

    pub fn insert_organization(&self, organization: Organization) {
        self.state
            .write()
            .organizations
            .insert(organization.id, organization);
    }

    pub fn insert_role(&self, role: Role) {
        self.state.write().roles.insert(role.id, role);
    }

    pub fn insert_branch(&self, branch: Branch) {
        self.state.write().branches.insert(branch.id, branch);
    }

    pub fn assign_role(&self, user_id: UserId, role_id: RoleId, last_used: bool) {
        let mut state = self.state.write();
        let touched = state.tick();
        state.user_roles.push(Assignment {
            user_id,
            target: role_id,
            last_used,
            touched,
        });
    }

    pub fn assign_branch(&self, user_id: UserId, branch_id: BranchId, last_used: bool) {
        let mut state = self.state.write();
        let touched = state.tick();
        state.user_branches.push(Assignment {
            user_id,
            target: branch_id,
            last_used,
            touched,
        });
    }

    pub fn insert_filter_group(
        &self,
        id: FilterGroupId,
        user_id: UserId,
        table_id: TableId,
        name: impl Into<String>,
        order: i32,
    ) {
        self.state.write().groups.insert(
            id,
            GroupRow {
                id,
                user_id,
                table_id,
                name: name.into(),
                order,
            },
        );
    }

    pub fn insert_filter(&self, filter: SavedFilter) {
        self.state.write().filters.insert(filter.id, filter);
    }

    /// Flips the active flag directly, without going through a write path.
    pub fn set_user_active(&self, user_id: UserId, active: bool) {
        if let Some(row) = self.state.write().users.get_mut(&user_id) {
            row.seed.active = active;
        }
    }

    pub fn set_onboarding(&self, user_id: UserId, status: OnboardingStatus) {
        if let Some(row) = self.state.write().users.get_mut(&user_id) {
            row.onboarding = status;
        }
    }

    pub fn set_system_settings(&self, settings: NotificationSettings) {
        self.state.write().system_settings = Some(settings);
    }
}
