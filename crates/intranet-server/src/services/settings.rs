use std::sync::Arc;

use intranet_cache::CacheLayer;
use intranet_core::{NotificationSettings, UserId};
use intranet_storage::NotificationSettingsRepository;

use crate::error::ServiceError;

pub struct SettingsService {
    repository: Arc<dyn NotificationSettingsRepository>,
    caches: Arc<CacheLayer>,
}

impl SettingsService {
    pub fn new(
        repository: Arc<dyn NotificationSettingsRepository>,
        caches: Arc<CacheLayer>,
    ) -> Self {
        Self { repository, caches }
    }

    /// Settings that apply to the user: own, else system, else defaults.
    pub async fn effective(&self, user_id: UserId) -> NotificationSettings {
        self.caches
            .notification_settings
            .effective_settings(user_id)
            .await
    }

    pub async fn system(&self) -> NotificationSettings {
        self.caches
            .notification_settings
            .system_settings()
            .await
            .map(|settings| settings.as_ref().clone())
            .unwrap_or_default()
    }

    pub async fn update_user(
        &self,
        user_id: UserId,
        settings: &NotificationSettings,
    ) -> Result<NotificationSettings, ServiceError> {
        let updated = self
            .repository
            .update_user_settings(user_id, settings)
            .await?;
        self.caches
            .notification_settings
            .invalidate_user_settings(user_id);
        Ok(updated)
    }

    pub async fn update_system(
        &self,
        settings: &NotificationSettings,
    ) -> Result<NotificationSettings, ServiceError> {
        let updated = self.repository.update_system_settings(settings).await?;
        self.caches
            .notification_settings
            .invalidate_system_settings();
        Ok(updated)
    }
}
