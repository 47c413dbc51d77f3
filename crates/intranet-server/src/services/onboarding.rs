use std::sync::Arc;

use intranet_cache::CacheLayer;
use intranet_core::{OnboardingProgress, OnboardingStatus, UserId};
use intranet_storage::OnboardingRepository;

use crate::error::ServiceError;

pub struct OnboardingService {
    repository: Arc<dyn OnboardingRepository>,
    caches: Arc<CacheLayer>,
}

impl OnboardingService {
    pub fn new(repository: Arc<dyn OnboardingRepository>, caches: Arc<CacheLayer>) -> Self {
        Self { repository, caches }
    }

    pub async fn status(&self, user_id: UserId) -> Result<Arc<OnboardingStatus>, ServiceError> {
        self.caches
            .onboarding
            .get(user_id)
            .await
            .ok_or_else(|| ServiceError::not_found("Onboarding status", user_id))
    }

    pub async fn update_progress(
        &self,
        user_id: UserId,
        progress: &OnboardingProgress,
    ) -> Result<OnboardingStatus, ServiceError> {
        let status = self
            .repository
            .update_onboarding_progress(user_id, progress)
            .await?;
        self.caches.onboarding.invalidate(user_id);
        Ok(status)
    }

    pub async fn complete(&self, user_id: UserId) -> Result<OnboardingStatus, ServiceError> {
        let status = self.repository.complete_onboarding(user_id).await?;
        self.caches.onboarding.invalidate(user_id);
        Ok(status)
    }
}
