//! Core domain types for the intranet cache layer.
//!
//! Typed ids, the user/role/branch records the caches hold, saved filters and
//! filter groups, onboarding status and notification settings.

pub mod clock;
pub mod error;
pub mod filter;
pub mod id;
pub mod onboarding;
pub mod organization;
pub mod settings;
pub mod user;

pub use clock::now_utc;
pub use error::{CoreError, Result};
pub use filter::{
    FilterGroup, SavedFilter, SavedFilterDraft, SortDirection, SortOrder, USER_GROUP_NAMES,
    USER_REFERENCE_PREFIX,
};
pub use id::{BranchId, FilterGroupId, FilterId, OrganizationId, RoleId, TableId, UserId};
pub use onboarding::{OnboardingProgress, OnboardingStatus};
pub use organization::{Branch, Organization, OrganizationContext};
pub use settings::{NotificationSettings, UserNotificationSettings};
pub use user::{
    DEFAULT_LANGUAGE, LanguagePreference, Permission, User, UserBranch, UserRole, UserUpdate,
};
