//! Read and write paths over the repositories and caches.
//!
//! Reads go through the caches. Writes go to the repositories and, once the
//! write succeeded, invalidate every cache whose value may now be stale.
//! A failed write leaves the caches untouched.

pub mod filters;
pub mod onboarding;
pub mod settings;
pub mod users;

use std::sync::Arc;

use intranet_cache::{CacheLayer, Repositories};

pub use filters::FilterService;
pub use onboarding::OnboardingService;
pub use settings::SettingsService;
pub use users::UserService;

/// All services, sharing one cache layer.
#[derive(Clone)]
pub struct Services {
    pub users: Arc<UserService>,
    pub onboarding: Arc<OnboardingService>,
    pub filters: Arc<FilterService>,
    pub settings: Arc<SettingsService>,
}

impl Services {
    pub fn new(repositories: &Repositories, caches: Arc<CacheLayer>) -> Self {
        Self {
            users: Arc::new(UserService::new(repositories.users.clone(), caches.clone())),
            onboarding: Arc::new(OnboardingService::new(
                repositories.onboarding.clone(),
                caches.clone(),
            )),
            filters: Arc::new(FilterService::new(repositories.filters.clone(), caches.clone())),
            settings: Arc::new(SettingsService::new(
                repositories.notification_settings.clone(),
                caches,
            )),
        }
    }
}
