//! Saved table filters and filter groups.
//!
//! Filter `conditions` and `operators` are stored as opaque JSON payloads. The
//! only structure this module looks into is the `value` of a condition, to find
//! references to users in the `user-<id>` form used by "Users" filter groups.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::id::{FilterGroupId, FilterId, TableId, UserId};

/// Prefix of condition values that reference a user.
pub const USER_REFERENCE_PREFIX: &str = "user-";

/// Group names (de/en/es) whose filters each target a single user.
pub const USER_GROUP_NAMES: [&str; 3] = ["Users", "Benutzer", "Usuarios"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDirection {
    pub column: String,
    pub direction: SortOrder,
    pub priority: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SortDirectionsRepr {
    List(Vec<SortDirection>),
    /// Older rows store `{ "column": "asc" }`; priority follows key order.
    Legacy(IndexMap<String, SortOrder>),
}

fn deserialize_sort_directions<'de, D>(deserializer: D) -> Result<Vec<SortDirection>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = Option::<SortDirectionsRepr>::deserialize(deserializer)?;
    Ok(match repr {
        None => Vec::new(),
        Some(SortDirectionsRepr::List(list)) => list,
        Some(SortDirectionsRepr::Legacy(map)) => map
            .into_iter()
            .enumerate()
            .map(|(index, (column, direction))| SortDirection {
                column,
                direction,
                priority: index as u32 + 1,
            })
            .collect(),
    })
}

/// A saved filter for one user and table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFilter {
    pub id: FilterId,
    pub user_id: UserId,
    pub table_id: TableId,
    pub name: String,
    #[serde(default)]
    pub conditions: Value,
    #[serde(default)]
    pub operators: Value,
    #[serde(default, deserialize_with = "deserialize_sort_directions")]
    pub sort_directions: Vec<SortDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<FilterGroupId>,
    #[serde(default)]
    pub order: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Parses a `user-<id>` condition value.
///
/// Returns `None` when the value is not a user reference at all and
/// `Some(None)` when it has the prefix but no valid id.
fn user_reference(value: &Value) -> Option<Option<UserId>> {
    let raw = value.as_str()?.strip_prefix(USER_REFERENCE_PREFIX)?;
    Some(raw.parse::<UserId>().ok())
}

fn condition_values(conditions: &Value) -> impl Iterator<Item = &Value> {
    conditions
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|condition| condition.get("value"))
}

impl SavedFilter {
    /// Ids of all users referenced by this filter's conditions.
    pub fn referenced_user_ids(&self) -> Vec<UserId> {
        condition_values(&self.conditions)
            .filter_map(user_reference)
            .flatten()
            .collect()
    }

    /// Whether the filter still points at at least one active user.
    ///
    /// Conditions without a user reference count as satisfied. An empty
    /// condition list has nothing to satisfy and is dropped; a non-array
    /// `conditions` value is kept.
    pub fn references_active_user(&self, active: &HashSet<UserId>) -> bool {
        let Some(conditions) = self.conditions.as_array() else {
            return true;
        };
        conditions.iter().any(|condition| {
            match condition.get("value").and_then(user_reference) {
                Some(Some(user_id)) => active.contains(&user_id),
                Some(None) => false,
                None => true,
            }
        })
    }
}

/// Input for creating or updating a saved filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFilterDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FilterId>,
    pub user_id: UserId,
    pub table_id: TableId,
    pub name: String,
    #[serde(default)]
    pub conditions: Value,
    #[serde(default)]
    pub operators: Value,
    #[serde(default, deserialize_with = "deserialize_sort_directions")]
    pub sort_directions: Vec<SortDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<FilterGroupId>,
    #[serde(default)]
    pub order: i32,
}

/// A named, ordered group of saved filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterGroup {
    pub id: FilterGroupId,
    pub user_id: UserId,
    pub table_id: TableId,
    pub name: String,
    pub order: i32,
    #[serde(default)]
    pub filters: Vec<SavedFilter>,
}

impl FilterGroup {
    /// Whether this group lists one filter per user.
    pub fn is_user_group(&self) -> bool {
        USER_GROUP_NAMES.contains(&self.name.as_str())
    }

    pub fn referenced_user_ids(&self) -> Vec<UserId> {
        self.filters
            .iter()
            .flat_map(SavedFilter::referenced_user_ids)
            .collect()
    }

    /// Drops filters that no longer reference an active user.
    pub fn retain_active_users(&mut self, active: &HashSet<UserId>) {
        self.filters
            .retain(|filter| filter.references_active_user(active));
    }
}
