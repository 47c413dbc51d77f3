use intranet_core::{
    Branch, BranchId, FilterId, OnboardingProgress, Organization, OrganizationId, RoleId,
    SavedFilterDraft, TableId, UserId, UserUpdate,
};
use intranet_db_memory::{InMemoryStore, Operation, Role, UserSeed, seed::seed_demo};
use intranet_storage::{
    BranchRepository, FilterRepository, OnboardingRepository, OrganizationRepository,
    UserRepository,
};
use serde_json::json;

fn organization(id: i64, language: Option<&str>) -> Organization {
    Organization {
        id: OrganizationId::new(id),
        name: format!("org-{id}"),
        display_name: format!("Org {id}"),
        default_language: language.map(str::to_string),
    }
}

fn branch(id: i64, organization_id: i64) -> Branch {
    Branch {
        id: BranchId::new(id),
        name: format!("branch-{id}"),
        organization_id: OrganizationId::new(organization_id),
    }
}

/// User 1 holds role 10 (org 1, active) and role 20 (org 2), with branch 100
/// in org 1 (active) and branch 200 in org 2.
fn two_tenant_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store.insert_organization(organization(1, Some("de")));
    store.insert_organization(organization(2, Some("en")));
    store.insert_role(Role::new(10, "admin", Some(1)));
    store.insert_role(Role::new(20, "staff", Some(2)));
    store.insert_branch(branch(100, 1));
    store.insert_branch(branch(200, 2));
    store.insert_user(UserSeed::new(1, "anna"));
    store.assign_role(UserId::new(1), RoleId::new(10), true);
    store.assign_role(UserId::new(1), RoleId::new(20), false);
    store.assign_branch(UserId::new(1), BranchId::new(100), true);
    store.assign_branch(UserId::new(1), BranchId::new(200), false);
    store
}

#[tokio::test]
async fn find_user_includes_roles_and_branches() {
    let store = two_tenant_store();
    let user = store.find_user(UserId::new(1)).await.unwrap().unwrap();

    assert_eq!(user.roles.len(), 2);
    assert_eq!(user.active_role().unwrap().role_id, RoleId::new(10));
    assert_eq!(user.active_branch().unwrap().branch_id, BranchId::new(100));
    assert!(store.find_user(UserId::new(99)).await.unwrap().is_none());
    assert_eq!(store.calls(Operation::FindUser), 2);
}

#[tokio::test]
async fn language_falls_back_to_active_organization() {
    let store = two_tenant_store();
    let preference = store.find_language(UserId::new(1)).await.unwrap().unwrap();
    assert_eq!(preference.user_language, None);
    assert_eq!(preference.effective_language(), "de");

    store
        .update_user(
            UserId::new(1),
            &UserUpdate {
                language: Some("es".into()),
                ..UserUpdate::default()
            },
        )
        .await
        .unwrap();
    let preference = store.find_language(UserId::new(1)).await.unwrap().unwrap();
    assert_eq!(preference.effective_language(), "es");
}

#[tokio::test]
async fn switch_role_moves_organization_and_branch() {
    let store = two_tenant_store();
    let user = store
        .switch_role(UserId::new(1), RoleId::new(20))
        .await
        .unwrap();

    assert_eq!(user.active_role().unwrap().role_id, RoleId::new(20));
    assert_eq!(user.active_branch().unwrap().branch_id, BranchId::new(200));

    let context = store
        .find_active_organization(UserId::new(1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(context.organization.id, OrganizationId::new(2));

    let branch = store
        .find_active_branch(UserId::new(1), OrganizationId::new(2), RoleId::new(20))
        .await
        .unwrap();
    assert_eq!(branch.map(|b| b.id), Some(BranchId::new(200)));
}

#[tokio::test]
async fn switch_role_rejects_unassigned_role() {
    let store = two_tenant_store();
    store.insert_role(Role::new(30, "guest", Some(1)));

    let err = store
        .switch_role(UserId::new(1), RoleId::new(30))
        .await
        .unwrap_err();
    assert!(!err.is_not_found());
    assert!(err.to_string().contains("not assigned"));
}

#[tokio::test]
async fn active_branch_requires_role_in_organization() {
    let store = two_tenant_store();
    let branch = store
        .find_active_branch(UserId::new(1), OrganizationId::new(2), RoleId::new(10))
        .await
        .unwrap();
    assert!(branch.is_none());
}

#[tokio::test]
async fn set_roles_keeps_previous_active_role_when_present() {
    let store = two_tenant_store();
    let user = store
        .set_roles(UserId::new(1), &[RoleId::new(20), RoleId::new(10)])
        .await
        .unwrap();
    assert_eq!(user.active_role().unwrap().role_id, RoleId::new(10));

    let user = store
        .set_roles(UserId::new(1), &[RoleId::new(20)])
        .await
        .unwrap();
    assert_eq!(user.active_role().unwrap().role_id, RoleId::new(20));

    let err = store
        .set_roles(UserId::new(1), &[RoleId::new(77)])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn active_user_ids_filters_inactive_and_unknown() {
    let store = InMemoryStore::new();
    store.insert_user(UserSeed::new(1, "a"));
    store.insert_user(UserSeed::new(2, "b").inactive());

    let active = store
        .find_active_user_ids(&[UserId::new(1), UserId::new(2), UserId::new(3)])
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert!(active.contains(&UserId::new(1)));
}

#[tokio::test]
async fn onboarding_progress_then_completion() {
    let store = two_tenant_store();
    let status = store
        .find_onboarding_status(UserId::new(1))
        .await
        .unwrap()
        .unwrap();
    assert!(!status.is_started());

    let status = store
        .update_onboarding_progress(
            UserId::new(1),
            &OnboardingProgress {
                current_step: 2,
                completed_steps: vec![1],
                dismissed_steps: vec![],
            },
        )
        .await
        .unwrap();
    assert!(status.started_at.is_some());
    assert!(!status.completed);

    let status = store.complete_onboarding(UserId::new(1)).await.unwrap();
    assert!(status.completed);
    assert!(status.completed_at.is_some());
    assert_eq!(status.progress.current_step, 2);
}

#[tokio::test]
async fn save_and_delete_filters() {
    let store = two_tenant_store();
    let tasks = TableId::new("tasks").unwrap();
    let draft = SavedFilterDraft {
        id: None,
        user_id: UserId::new(1),
        table_id: tasks.clone(),
        name: "Open".into(),
        conditions: json!([{ "column": "status", "value": "open" }]),
        operators: json!([]),
        sort_directions: vec![],
        group_id: None,
        order: 0,
    };

    let created = store.save_filter(&draft).await.unwrap();
    assert_eq!(created.id, FilterId::new(1));

    let updated = store
        .save_filter(&SavedFilterDraft {
            id: Some(created.id),
            name: "Still open".into(),
            ..draft.clone()
        })
        .await
        .unwrap();
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(
        store
            .find_saved_filters(UserId::new(1), &tasks)
            .await
            .unwrap()
            .len(),
        1
    );

    let deleted = store.delete_filter(created.id).await.unwrap();
    assert_eq!(deleted.name, "Still open");
    assert!(store.find_saved_filter(created.id).await.unwrap().is_none());
    assert!(store.delete_filter(created.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn failing_operation_returns_transient_error_and_is_counted() {
    let store = two_tenant_store();
    store.set_failing(Operation::FindUser, true);

    let err = store.find_user(UserId::new(1)).await.unwrap_err();
    assert!(err.is_transient());
    assert_eq!(store.calls(Operation::FindUser), 1);

    store.set_failing(Operation::FindUser, false);
    assert!(store.find_user(UserId::new(1)).await.unwrap().is_some());

    store.reset_calls();
    assert_eq!(store.calls(Operation::FindUser), 0);
}

#[tokio::test]
async fn demo_seed_has_user_group_with_inactive_reference() {
    let store = InMemoryStore::new();
    seed_demo(&store).unwrap();

    let groups = store
        .find_filter_groups(UserId::new(1), &TableId::new("tasks").unwrap())
        .await
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert!(groups[0].is_user_group());
    assert_eq!(groups[0].filters.len(), 2);
}
