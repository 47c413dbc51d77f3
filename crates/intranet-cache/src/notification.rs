use std::sync::Arc;

use intranet_core::{NotificationSettings, UserId};
use intranet_storage::NotificationSettingsRepository;

use crate::config::CachePolicy;
use crate::error::CacheError;
use crate::keys::SystemSettingsKey;
use crate::registry::CleanupTarget;
use crate::stats::CacheStats;
use crate::ttl::TtlCache;

pub const NOTIFICATION_SETTINGS_CACHE: &str = "notification-settings";

/// Caches per-user notification settings and the system-wide record.
///
/// Both maps share one policy and are registered as a single cache.
pub struct NotificationSettingsCache {
    users: TtlCache<UserId, Arc<NotificationSettings>>,
    system: TtlCache<SystemSettingsKey, Arc<NotificationSettings>>,
    repository: Arc<dyn NotificationSettingsRepository>,
}

impl NotificationSettingsCache {
    pub fn new(repository: Arc<dyn NotificationSettingsRepository>, policy: &CachePolicy) -> Self {
        Self {
            users: TtlCache::from_policy(format!("{NOTIFICATION_SETTINGS_CACHE}.user"), policy),
            system: TtlCache::from_policy(format!("{NOTIFICATION_SETTINGS_CACHE}.system"), policy),
            repository,
        }
    }

    pub async fn user_settings(&self, user_id: UserId) -> Option<Arc<NotificationSettings>> {
        self.users
            .get_or_fetch(user_id, || async move {
                self.repository
                    .find_user_settings(user_id)
                    .await
                    .map(|settings| settings.map(Arc::new))
            })
            .await
    }

    pub async fn system_settings(&self) -> Option<Arc<NotificationSettings>> {
        self.system
            .get_or_fetch(SystemSettingsKey, || async move {
                self.repository
                    .find_system_settings()
                    .await
                    .map(|settings| settings.map(Arc::new))
            })
            .await
    }

    /// The user's own settings, else the system settings, else the defaults.
    pub async fn effective_settings(&self, user_id: UserId) -> NotificationSettings {
        if let Some(settings) = self.user_settings(user_id).await {
            return settings.as_ref().clone();
        }
        self.system_settings()
            .await
            .map(|settings| settings.as_ref().clone())
            .unwrap_or_default()
    }

    pub fn invalidate_user_settings(&self, user_id: UserId) {
        self.users.invalidate(&user_id);
    }

    pub fn invalidate_system_settings(&self) {
        self.system.invalidate(&SystemSettingsKey);
    }

    pub fn clear(&self) {
        self.users.clear();
        self.system.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.users.stats() + self.system.stats()
    }
}

impl CleanupTarget for NotificationSettingsCache {
    fn name(&self) -> &str {
        NOTIFICATION_SETTINGS_CACHE
    }

    fn cleanup(&self) -> Result<usize, CacheError> {
        Ok(self.users.cleanup() + self.system.cleanup())
    }

    fn stats(&self) -> CacheStats {
        NotificationSettingsCache::stats(self)
    }

    fn clear(&self) {
        NotificationSettingsCache::clear(self);
    }
}
