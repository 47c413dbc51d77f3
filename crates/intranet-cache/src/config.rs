//! Per-cache TTL and size settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// TTL and size bound of a single cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicy {
    pub ttl_secs: u64,
    pub max_entries: usize,
}

impl CachePolicy {
    pub const fn new(ttl_secs: u64, max_entries: usize) -> Self {
        Self {
            ttl_secs,
            max_entries,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    fn validate(&self, name: &str) -> Result<(), String> {
        if self.ttl_secs == 0 {
            return Err(format!("cache.{name}.ttl_secs must be > 0"));
        }
        if self.max_entries == 0 {
            return Err(format!("cache.{name}.max_entries must be > 0"));
        }
        Ok(())
    }
}

/// Schedule of the periodic cleanup sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupSchedule {
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for CleanupSchedule {
    fn default() -> Self {
        Self {
            initial_delay_secs: default_initial_delay_secs(),
            interval_secs: default_interval_secs(),
        }
    }
}

impl CleanupSchedule {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

fn default_initial_delay_secs() -> u64 {
    60
}
fn default_interval_secs() -> u64 {
    300
}

fn default_user() -> CachePolicy {
    CachePolicy::new(300, 200)
}
fn default_user_language() -> CachePolicy {
    CachePolicy::new(600, 500)
}
fn default_organization() -> CachePolicy {
    CachePolicy::new(600, 200)
}
fn default_branch() -> CachePolicy {
    CachePolicy::new(300, 500)
}
fn default_onboarding() -> CachePolicy {
    CachePolicy::new(300, 200)
}
fn default_filter_list() -> CachePolicy {
    CachePolicy::new(300, 500)
}
fn default_saved_filter() -> CachePolicy {
    CachePolicy::new(300, 500)
}
fn default_notification_settings() -> CachePolicy {
    CachePolicy::new(300, 500)
}

/// Settings for every cache of the layer.
///
/// The filter-list policy applies to each of its two maps separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_user")]
    pub user: CachePolicy,
    #[serde(default = "default_user_language")]
    pub user_language: CachePolicy,
    #[serde(default = "default_organization")]
    pub organization: CachePolicy,
    #[serde(default = "default_branch")]
    pub branch: CachePolicy,
    #[serde(default = "default_onboarding")]
    pub onboarding: CachePolicy,
    #[serde(default = "default_filter_list")]
    pub filter_list: CachePolicy,
    #[serde(default = "default_saved_filter")]
    pub saved_filter: CachePolicy,
    #[serde(default = "default_notification_settings")]
    pub notification_settings: CachePolicy,
    #[serde(default)]
    pub cleanup: CleanupSchedule,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
            user_language: default_user_language(),
            organization: default_organization(),
            branch: default_branch(),
            onboarding: default_onboarding(),
            filter_list: default_filter_list(),
            saved_filter: default_saved_filter(),
            notification_settings: default_notification_settings(),
            cleanup: CleanupSchedule::default(),
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), String> {
        let policies = [
            ("user", &self.user),
            ("user_language", &self.user_language),
            ("organization", &self.organization),
            ("branch", &self.branch),
            ("onboarding", &self.onboarding),
            ("filter_list", &self.filter_list),
            ("saved_filter", &self.saved_filter),
            ("notification_settings", &self.notification_settings),
        ];
        for (name, policy) in policies {
            policy.validate(name)?;
        }
        if self.cleanup.interval_secs == 0 {
            return Err("cache.cleanup.interval_secs must be > 0".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_policies() {
        let config = CacheConfig::default();
        assert_eq!(config.user, CachePolicy::new(300, 200));
        assert_eq!(config.organization, CachePolicy::new(600, 200));
        assert_eq!(config.branch, CachePolicy::new(300, 500));
        assert_eq!(config.onboarding, CachePolicy::new(300, 200));
        assert_eq!(config.user_language, CachePolicy::new(600, 500));
        assert_eq!(config.filter_list, CachePolicy::new(300, 500));
        assert_eq!(config.cleanup.initial_delay(), Duration::from_secs(60));
        assert_eq!(config.cleanup.interval(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_ttl_and_size() {
        let mut config = CacheConfig::default();
        config.branch.ttl_secs = 0;
        assert_eq!(
            config.validate().unwrap_err(),
            "cache.branch.ttl_secs must be > 0"
        );

        let mut config = CacheConfig::default();
        config.saved_filter.max_entries = 0;
        assert!(config.validate().unwrap_err().contains("saved_filter"));

        let mut config = CacheConfig::default();
        config.cleanup.interval_secs = 0;
        assert!(config.validate().is_err());
    }
}
