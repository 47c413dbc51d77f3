//! In-process TTL caches for the intranet application.
//!
//! ## Architecture
//!
//! - [`TtlCache`]: generic keyed cache with a fixed TTL and a size bound that
//!   the cleanup sweep restores, oldest entries first.
//! - Domain caches wrap a `TtlCache` together with the repository they load
//!   from on a miss: users, user languages, organizations, branches,
//!   onboarding status, filter lists, saved filters, notification settings.
//! - [`CleanupRegistry`]: sweeps every registered cache on a schedule and
//!   fans out stats and clear requests, isolating failures per cache.
//! - [`CacheLayer`]: builds all of the above once at startup.
//!
//! ## Invalidation
//!
//! Caches never observe writes by themselves. Write paths call
//! `invalidate`/`clear` on every cache whose value may have gone stale after
//! the write succeeded. Lookup failures are logged and read as misses, so a
//! broken backend degrades to uncached reads instead of errors.

macro_rules! delegate_cleanup_target {
    ($cache:ty, $inner:ident) => {
        impl $crate::registry::CleanupTarget for $cache {
            fn name(&self) -> &str {
                self.$inner.name()
            }

            fn cleanup(&self) -> Result<usize, $crate::error::CacheError> {
                Ok(self.$inner.cleanup())
            }

            fn stats(&self) -> $crate::stats::CacheStats {
                self.$inner.stats()
            }

            fn clear(&self) {
                self.$inner.clear();
            }
        }
    };
}

pub mod branch;
pub mod config;
pub mod error;
pub mod filter_list;
pub mod keys;
pub mod language;
pub mod layer;
pub mod notification;
pub mod onboarding;
pub mod organization;
pub mod registry;
pub mod saved_filter;
pub mod stats;
pub mod ttl;
pub mod user;

pub use branch::{BRANCH_CACHE, BranchCache};
pub use config::{CacheConfig, CachePolicy, CleanupSchedule};
pub use error::CacheError;
pub use filter_list::{FILTER_LIST_CACHE, FilterListCache};
pub use keys::{BranchKey, FilterListKey, SystemSettingsKey};
pub use language::{USER_LANGUAGE_CACHE, UserLanguageCache};
pub use layer::{CacheLayer, Repositories};
pub use notification::{NOTIFICATION_SETTINGS_CACHE, NotificationSettingsCache};
pub use onboarding::{ONBOARDING_CACHE, OnboardingCache};
pub use organization::{ORGANIZATION_CACHE, OrganizationCache};
pub use registry::{CleanupOutcome, CleanupRegistry, CleanupReport, CleanupTarget};
pub use saved_filter::{SAVED_FILTER_CACHE, SavedFilterCache};
pub use stats::CacheStats;
pub use ttl::TtlCache;
pub use user::{USER_CACHE, UserCache};
