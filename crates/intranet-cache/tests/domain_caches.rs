use std::sync::Arc;

use intranet_cache::{
    BranchKey, CacheConfig, CacheError, CacheLayer, CacheStats, CleanupTarget, Repositories,
};
use intranet_core::{
    Branch, BranchId, FilterGroupId, FilterId, NotificationSettings, Organization,
    OrganizationId, RoleId, SavedFilter, TableId, UserId, now_utc,
};
use intranet_db_memory::{InMemoryStore, Operation, Role, UserSeed};
use serde_json::{Value, json};

fn tasks() -> TableId {
    TableId::new("tasks").unwrap()
}

fn saved_filter(id: i64, group: Option<i64>, conditions: Value) -> SavedFilter {
    let now = now_utc();
    SavedFilter {
        id: FilterId::new(id),
        user_id: UserId::new(1),
        table_id: tasks(),
        name: format!("filter-{id}"),
        conditions,
        operators: json!([]),
        sort_directions: vec![],
        group_id: group.map(FilterGroupId::new),
        order: 0,
        created_at: now,
        updated_at: now,
    }
}

fn setup() -> (Arc<InMemoryStore>, CacheLayer) {
    let store = Arc::new(InMemoryStore::new());
    store.insert_organization(Organization {
        id: OrganizationId::new(1),
        name: "hq".into(),
        display_name: "HQ".into(),
        default_language: Some("en".into()),
    });
    store.insert_role(Role::new(10, "admin", Some(1)));
    store.insert_branch(Branch {
        id: BranchId::new(100),
        name: "Berlin".into(),
        organization_id: OrganizationId::new(1),
    });
    store.insert_user(UserSeed::new(1, "owner").with_language("de"));
    store.insert_user(UserSeed::new(42, "colleague"));
    store.assign_role(UserId::new(1), RoleId::new(10), true);
    store.assign_branch(UserId::new(1), BranchId::new(100), true);

    let layer = CacheLayer::new(
        &Repositories::from_backend(store.clone()),
        &CacheConfig::default(),
    );
    (store, layer)
}

#[tokio::test]
async fn user_is_fetched_once_until_invalidated() {
    let (store, layer) = setup();

    let first = layer.users.get(UserId::new(1)).await.unwrap();
    let second = layer.users.get(UserId::new(1)).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(store.calls(Operation::FindUser), 1);

    layer.users.invalidate(UserId::new(1));
    layer.users.get(UserId::new(1)).await.unwrap();
    assert_eq!(store.calls(Operation::FindUser), 2);
}

#[tokio::test]
async fn language_invalidate_forces_fresh_fetch() {
    let (store, layer) = setup();

    let language = layer.user_languages.get(UserId::new(1)).await.unwrap();
    assert_eq!(&*language, "de");
    assert_eq!(store.calls(Operation::FindLanguage), 1);

    layer.user_languages.invalidate(UserId::new(1));
    layer.user_languages.get(UserId::new(1)).await.unwrap();
    assert_eq!(store.calls(Operation::FindLanguage), 2);
}

#[tokio::test]
async fn language_resolves_organization_then_default() {
    let (store, layer) = setup();

    // User 42 has no own language and no role: fallback to "de".
    assert_eq!(layer.user_languages.language_or_default(UserId::new(42)).await, "de");

    store.assign_role(UserId::new(42), RoleId::new(10), true);
    layer.user_languages.invalidate(UserId::new(42));
    assert_eq!(layer.user_languages.language_or_default(UserId::new(42)).await, "en");

    assert_eq!(layer.user_languages.language_or_default(UserId::new(999)).await, "de");
}

#[tokio::test]
async fn missing_rows_are_never_cached() {
    let (store, layer) = setup();

    assert!(layer.users.get(UserId::new(999)).await.is_none());
    assert!(layer.users.get(UserId::new(999)).await.is_none());
    assert_eq!(store.calls(Operation::FindUser), 2);

    assert!(layer.saved_filters.get(FilterId::new(5)).await.is_none());
    store.insert_filter(saved_filter(5, None, json!([])));
    assert!(layer.saved_filters.get(FilterId::new(5)).await.is_some());
}

#[tokio::test]
async fn fetch_failures_are_misses_and_not_cached() {
    let (store, layer) = setup();
    store.set_failing(Operation::FindActiveOrganization, true);

    assert!(layer.organizations.get(UserId::new(1)).await.is_none());
    assert_eq!(layer.organizations.stats().size, 0);

    store.set_failing(Operation::FindActiveOrganization, false);
    let context = layer.organizations.get(UserId::new(1)).await.unwrap();
    assert_eq!(context.organization.id, OrganizationId::new(1));
    assert_eq!(store.calls(Operation::FindActiveOrganization), 2);
}

#[tokio::test]
async fn branch_keys_isolate_tuples() {
    let (store, layer) = setup();
    let key = BranchKey::new(UserId::new(1), OrganizationId::new(1), RoleId::new(10));
    let other_role = BranchKey::new(UserId::new(1), OrganizationId::new(1), RoleId::new(11));

    let branch = layer.branches.get(key).await.unwrap();
    assert_eq!(branch.id, BranchId::new(100));
    assert!(layer.branches.get(other_role).await.is_none());
    layer.branches.get(key).await.unwrap();

    assert_eq!(store.calls(Operation::FindActiveBranch), 2);
    assert_eq!(layer.branches.stats().size, 1);
}

#[tokio::test]
async fn filter_invalidate_fans_out_to_both_maps() {
    let (store, layer) = setup();
    let user = UserId::new(1);

    assert!(layer.filter_lists.get_filters(user, &tasks()).await.unwrap().is_empty());
    assert!(layer.filter_lists.get_filter_groups(user, &tasks()).await.unwrap().is_empty());
    assert_eq!(layer.filter_lists.stats().size, 2);

    layer.filter_lists.invalidate(user, &tasks());
    assert_eq!(layer.filter_lists.stats().size, 0);

    layer.filter_lists.get_filters(user, &tasks()).await.unwrap();
    layer.filter_lists.get_filter_groups(user, &tasks()).await.unwrap();
    assert_eq!(store.calls(Operation::FindSavedFilters), 2);
    assert_eq!(store.calls(Operation::FindFilterGroups), 2);

    // Another table of the same user is a separate line.
    let requests = TableId::new("requests").unwrap();
    layer.filter_lists.invalidate(user, &requests);
    assert_eq!(layer.filter_lists.stats().size, 2);
}

#[tokio::test]
async fn users_group_drops_inactive_users_only_on_population() {
    let (store, layer) = setup();
    let owner = UserId::new(1);
    store.insert_filter_group(FilterGroupId::new(1), owner, tasks(), "Benutzer", 1);
    store.insert_filter(saved_filter(
        1,
        Some(1),
        json!([{ "column": "responsible", "value": "user-42" }]),
    ));
    store.insert_filter(saved_filter(
        2,
        Some(1),
        json!([{ "column": "status", "value": "open" }]),
    ));

    let groups = layer.filter_lists.get_filter_groups(owner, &tasks()).await.unwrap();
    assert_eq!(groups[0].filters.len(), 2);

    // Deactivated behind the cache's back: the cached entry is stale.
    store.set_user_active(UserId::new(42), false);
    let groups = layer.filter_lists.get_filter_groups(owner, &tasks()).await.unwrap();
    assert_eq!(groups[0].filters.len(), 2);

    layer.filter_lists.clear();
    let groups = layer.filter_lists.get_filter_groups(owner, &tasks()).await.unwrap();
    let ids: Vec<_> = groups[0].filters.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![FilterId::new(2)]);
}

#[tokio::test]
async fn users_group_drops_filters_without_conditions() {
    let (store, layer) = setup();
    let owner = UserId::new(1);
    store.set_user_active(UserId::new(42), false);
    store.insert_filter_group(FilterGroupId::new(1), owner, tasks(), "Users", 1);
    store.insert_filter(saved_filter(1, Some(1), json!([{ "value": "user-42" }])));
    store.insert_filter(saved_filter(2, Some(1), json!([])));
    store.insert_filter_group(FilterGroupId::new(2), owner, tasks(), "Favorites", 2);
    store.insert_filter(saved_filter(3, Some(2), json!([])));

    let groups = layer.filter_lists.get_filter_groups(owner, &tasks()).await.unwrap();
    assert!(groups[0].filters.is_empty());
    // Groups that are not user groups are never filtered.
    assert_eq!(groups[1].filters.len(), 1);
}

#[tokio::test]
async fn active_user_check_is_one_query_per_population() {
    let (store, layer) = setup();
    let owner = UserId::new(1);
    store.insert_user(UserSeed::new(43, "former").inactive());
    store.insert_filter_group(FilterGroupId::new(1), owner, tasks(), "Users", 1);
    store.insert_filter_group(FilterGroupId::new(2), owner, tasks(), "Usuarios", 2);
    store.insert_filter_group(FilterGroupId::new(3), owner, tasks(), "Favorites", 3);
    store.insert_filter(saved_filter(1, Some(1), json!([{ "value": "user-42" }])));
    store.insert_filter(saved_filter(2, Some(2), json!([{ "value": "user-43" }])));
    store.insert_filter(saved_filter(3, Some(3), json!([{ "value": "user-43" }])));

    let groups = layer.filter_lists.get_filter_groups(owner, &tasks()).await.unwrap();
    assert_eq!(store.calls(Operation::FindActiveUserIds), 1);
    assert_eq!(groups[0].filters.len(), 1);
    assert!(groups[1].filters.is_empty());
    // Only user groups are checked.
    assert_eq!(groups[2].filters.len(), 1);
}

#[tokio::test]
async fn onboarding_and_settings_caches() {
    let (store, layer) = setup();

    let status = layer.onboarding.get(UserId::new(1)).await.unwrap();
    assert!(!status.completed);

    store.set_system_settings(NotificationSettings {
        email_enabled: false,
        ..NotificationSettings::default()
    });
    let effective = layer
        .notification_settings
        .effective_settings(UserId::new(1))
        .await;
    assert!(!effective.email_enabled);

    store.set_system_settings(NotificationSettings::default());
    let effective = layer
        .notification_settings
        .effective_settings(UserId::new(1))
        .await;
    assert!(!effective.email_enabled, "system settings are cached");

    layer.notification_settings.invalidate_system_settings();
    let effective = layer
        .notification_settings
        .effective_settings(UserId::new(1))
        .await;
    assert_eq!(effective, NotificationSettings::default());
}

#[tokio::test]
async fn registry_lists_caches_in_registration_order() {
    let (_store, layer) = setup();
    assert_eq!(
        layer.registry.names(),
        vec![
            "user",
            "user-language",
            "organization",
            "branch",
            "onboarding",
            "filter-list",
            "saved-filter",
            "notification-settings",
        ]
    );

    layer.users.get(UserId::new(1)).await.unwrap();
    let stats = layer.registry.all_stats();
    assert_eq!(stats.len(), 8);
    assert_eq!(stats["user"].size, 1);
    assert_eq!(stats["user"].misses, 1);

    assert_eq!(layer.registry.clear_all(), 8);
    assert_eq!(layer.users.stats().size, 0);
}

struct ExplodingCache;

impl CleanupTarget for ExplodingCache {
    fn name(&self) -> &str {
        "exploding"
    }

    fn cleanup(&self) -> Result<usize, CacheError> {
        Err(CacheError::cleanup_failed("exploding", "sweep failed"))
    }

    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }

    fn clear(&self) {}
}

#[tokio::test]
async fn sweep_survives_a_failing_cache() {
    let (_store, layer) = setup();
    assert!(layer.registry.register(Arc::new(ExplodingCache)));
    layer.users.get(UserId::new(1)).await.unwrap();

    let report = layer.registry.run_cleanup();
    assert_eq!(report.caches.len(), 9);
    assert_eq!(report.failed().count(), 1);
    assert_eq!(report.total_deleted, 0);
    // Healthy caches were still swept and reported.
    assert_eq!(report.caches[0].stats.unwrap().size, 1);
}

#[tokio::test]
async fn layer_start_is_idempotent() {
    let (_store, layer) = setup();
    assert!(layer.start());
    assert!(!layer.start());
    layer.stop();
    layer.stop();
}
