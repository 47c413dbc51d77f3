use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingProgress {
    pub current_step: u32,
    #[serde(default)]
    pub completed_steps: Vec<u32>,
    #[serde(default)]
    pub dismissed_steps: Vec<u32>,
}

/// Onboarding state of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStatus {
    pub completed: bool,
    #[serde(default)]
    pub progress: OnboardingProgress,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
}

impl OnboardingStatus {
    pub fn is_started(&self) -> bool {
        self.started_at.is_some() || self.progress.current_step > 0
    }
}
