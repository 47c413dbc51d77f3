//! Demo data for running the server without a database.

use intranet_core::{
    Branch, BranchId, FilterGroupId, FilterId, NotificationSettings, Organization,
    OrganizationId, RoleId, SavedFilter, SortDirection, SortOrder, TableId, UserId, now_utc,
};
use intranet_storage::StorageError;
use serde_json::json;

use crate::storage::{InMemoryStore, Role, UserSeed};

/// Seeds two organizations, three users and one shared user filter group.
///
/// # Errors
///
/// Returns `StorageError::Internal` if a seeded table id is rejected.
pub fn seed_demo(store: &InMemoryStore) -> Result<(), StorageError> {
    let tasks = TableId::new("tasks").map_err(|e| StorageError::internal(e.to_string()))?;

    for (id, name, language) in [(1, "hq", "de"), (2, "branch-office", "en")] {
        store.insert_organization(Organization {
            id: OrganizationId::new(id),
            name: name.to_string(),
            display_name: name.replace('-', " "),
            default_language: Some(language.to_string()),
        });
    }
    store.insert_role(Role::new(1, "admin", Some(1)));
    store.insert_role(Role::new(2, "staff", Some(2)));
    for (id, name, organization) in [(1, "Berlin", 1), (2, "Hamburg", 1), (3, "London", 2)] {
        store.insert_branch(Branch {
            id: BranchId::new(id),
            name: name.to_string(),
            organization_id: OrganizationId::new(organization),
        });
    }

    store.insert_user(UserSeed::new(1, "admin"));
    store.insert_user(UserSeed::new(2, "jane").with_language("en"));
    store.insert_user(UserSeed::new(3, "former").inactive());

    store.assign_role(UserId::new(1), RoleId::new(1), true);
    store.assign_role(UserId::new(1), RoleId::new(2), false);
    store.assign_branch(UserId::new(1), BranchId::new(1), true);
    store.assign_branch(UserId::new(1), BranchId::new(3), false);
    store.assign_role(UserId::new(2), RoleId::new(2), true);
    store.assign_branch(UserId::new(2), BranchId::new(3), true);

    store.insert_filter_group(FilterGroupId::new(1), UserId::new(1), tasks.clone(), "Users", 1);
    let now = now_utc();
    for (id, assignee) in [(1, 2), (2, 3)] {
        store.insert_filter(SavedFilter {
            id: FilterId::new(id),
            user_id: UserId::new(1),
            table_id: tasks.clone(),
            name: format!("Assigned to user {assignee}"),
            conditions: json!([{ "column": "assignee", "value": format!("user-{assignee}") }]),
            operators: json!([]),
            sort_directions: vec![SortDirection {
                column: "dueDate".to_string(),
                direction: SortOrder::Asc,
                priority: 1,
            }],
            group_id: Some(FilterGroupId::new(1)),
            order: i32::try_from(id).unwrap_or(i32::MAX),
            created_at: now,
            updated_at: now,
        });
    }

    store.set_system_settings(NotificationSettings::default());
    Ok(())
}
