//! Composite cache keys.
//!
//! Every component of a key is part of its identity, so two users (or the
//! same user in two organizations) never share a cache line.

use std::fmt;

use intranet_core::{OrganizationId, RoleId, TableId, UserId};

/// Key of the branch cache: `userId:organizationId:roleId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BranchKey {
    pub user_id: UserId,
    pub organization_id: OrganizationId,
    pub role_id: RoleId,
}

impl BranchKey {
    pub fn new(user_id: UserId, organization_id: OrganizationId, role_id: RoleId) -> Self {
        Self {
            user_id,
            organization_id,
            role_id,
        }
    }
}

impl fmt::Display for BranchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.user_id, self.organization_id, self.role_id
        )
    }
}

/// Key of both filter-list maps: `userId:tableId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterListKey {
    pub user_id: UserId,
    pub table_id: TableId,
}

impl FilterListKey {
    pub fn new(user_id: UserId, table_id: TableId) -> Self {
        Self { user_id, table_id }
    }
}

impl fmt::Display for FilterListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.user_id, self.table_id)
    }
}

/// The single key of the system notification settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemSettingsKey;

impl fmt::Display for SystemSettingsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("system")
    }
}
