use serde::{Deserialize, Serialize};

use crate::id::{BranchId, OrganizationId, RoleId, UserId};

/// Language used when neither the user nor the organization sets one.
pub const DEFAULT_LANGUAGE: &str = "de";

/// A permission granted by a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub entity: String,
    pub entity_type: String,
    pub access_level: String,
}

/// A role assignment of a user, joined with the role row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    pub role_id: RoleId,
    pub role_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<OrganizationId>,
    /// Marks the role the user is currently working in.
    pub last_used: bool,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// A branch assignment of a user, joined with the branch row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBranch {
    pub branch_id: BranchId,
    pub branch_name: String,
    pub organization_id: OrganizationId,
    pub last_used: bool,
}

/// A user with roles and branches, as served to request handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub active: bool,
    #[serde(default)]
    pub roles: Vec<UserRole>,
    #[serde(default)]
    pub branches: Vec<UserBranch>,
}

impl User {
    /// The role marked as last used, if any.
    pub fn active_role(&self) -> Option<&UserRole> {
        self.roles.iter().find(|r| r.last_used)
    }

    /// The branch marked as last used, if any.
    pub fn active_branch(&self) -> Option<&UserBranch> {
        self.branches.iter().find(|b| b.last_used)
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Partial update of a user profile. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl UserUpdate {
    pub fn touches_language(&self) -> bool {
        self.language.is_some()
    }

    pub fn touches_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Language settings relevant for resolving the UI language of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagePreference {
    #[serde(default)]
    pub user_language: Option<String>,
    #[serde(default)]
    pub organization_language: Option<String>,
}

impl LanguagePreference {
    /// User language, else the organization default, else [`DEFAULT_LANGUAGE`].
    pub fn effective_language(&self) -> &str {
        [&self.user_language, &self.organization_language]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|lang| !lang.trim().is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
    }
}
