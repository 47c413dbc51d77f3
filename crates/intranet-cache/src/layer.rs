//! Composition root for the cache layer.

use std::sync::Arc;

use intranet_storage::{
    BranchRepository, FilterRepository, NotificationSettingsRepository, OnboardingRepository,
    OrganizationRepository, UserRepository,
};
use tracing::info;

use crate::branch::BranchCache;
use crate::config::CacheConfig;
use crate::filter_list::FilterListCache;
use crate::language::UserLanguageCache;
use crate::notification::NotificationSettingsCache;
use crate::onboarding::OnboardingCache;
use crate::organization::OrganizationCache;
use crate::registry::{CleanupRegistry, CleanupTarget};
use crate::saved_filter::SavedFilterCache;
use crate::user::UserCache;

/// Repositories the caches load from on a miss.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub organizations: Arc<dyn OrganizationRepository>,
    pub branches: Arc<dyn BranchRepository>,
    pub onboarding: Arc<dyn OnboardingRepository>,
    pub filters: Arc<dyn FilterRepository>,
    pub notification_settings: Arc<dyn NotificationSettingsRepository>,
}

impl Repositories {
    /// Uses one backend for every repository.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserRepository
            + OrganizationRepository
            + BranchRepository
            + OnboardingRepository
            + FilterRepository
            + NotificationSettingsRepository
            + 'static,
    {
        Self {
            users: backend.clone(),
            organizations: backend.clone(),
            branches: backend.clone(),
            onboarding: backend.clone(),
            filters: backend.clone(),
            notification_settings: backend,
        }
    }
}

/// Every cache of the application plus the registry that sweeps them.
///
/// Built once at startup and shared by handle. Caches are registered in a
/// fixed order, which is also the order of sweeps and stats:
/// user, user-language, organization, branch, onboarding, filter-list,
/// saved-filter, notification-settings.
pub struct CacheLayer {
    pub registry: Arc<CleanupRegistry>,
    pub users: Arc<UserCache>,
    pub user_languages: Arc<UserLanguageCache>,
    pub organizations: Arc<OrganizationCache>,
    pub branches: Arc<BranchCache>,
    pub onboarding: Arc<OnboardingCache>,
    pub filter_lists: Arc<FilterListCache>,
    pub saved_filters: Arc<SavedFilterCache>,
    pub notification_settings: Arc<NotificationSettingsCache>,
}

impl CacheLayer {
    pub fn new(repositories: &Repositories, config: &CacheConfig) -> Self {
        let registry = Arc::new(CleanupRegistry::new(config.cleanup));

        let users = Arc::new(UserCache::new(repositories.users.clone(), &config.user));
        let user_languages = Arc::new(UserLanguageCache::new(
            repositories.users.clone(),
            &config.user_language,
        ));
        let organizations = Arc::new(OrganizationCache::new(
            repositories.organizations.clone(),
            &config.organization,
        ));
        let branches = Arc::new(BranchCache::new(
            repositories.branches.clone(),
            &config.branch,
        ));
        let onboarding = Arc::new(OnboardingCache::new(
            repositories.onboarding.clone(),
            &config.onboarding,
        ));
        let filter_lists = Arc::new(FilterListCache::new(
            repositories.filters.clone(),
            repositories.users.clone(),
            &config.filter_list,
        ));
        let saved_filters = Arc::new(SavedFilterCache::new(
            repositories.filters.clone(),
            &config.saved_filter,
        ));
        let notification_settings = Arc::new(NotificationSettingsCache::new(
            repositories.notification_settings.clone(),
            &config.notification_settings,
        ));

        let targets: [Arc<dyn CleanupTarget>; 8] = [
            users.clone(),
            user_languages.clone(),
            organizations.clone(),
            branches.clone(),
            onboarding.clone(),
            filter_lists.clone(),
            saved_filters.clone(),
            notification_settings.clone(),
        ];
        for target in targets {
            registry.register(target);
        }
        info!(caches = registry.len(), "Cache layer initialized");

        Self {
            registry,
            users,
            user_languages,
            organizations,
            branches,
            onboarding,
            filter_lists,
            saved_filters,
            notification_settings,
        }
    }

    /// Starts the periodic cleanup sweep. Idempotent.
    pub fn start(&self) -> bool {
        self.registry.start()
    }

    pub fn stop(&self) {
        self.registry.stop();
    }
}
