use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// Which notification events are delivered, and on which channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub email_enabled: bool,
    pub push_enabled: bool,
    pub task_updates: bool,
    pub request_updates: bool,
    pub user_updates: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_enabled: false,
            push_enabled: true,
            task_updates: true,
            request_updates: true,
            user_updates: true,
        }
    }
}

/// Per-user override of the system notification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNotificationSettings {
    pub user_id: UserId,
    pub settings: NotificationSettings,
}
