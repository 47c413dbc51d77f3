//! # intranet-storage
//!
//! Persistence abstraction for the intranet cache layer.
//!
//! This crate defines the repository traits that the caches fetch from on a
//! miss and that the write paths mutate through. It contains no
//! implementation; `intranet-db-memory` provides an in-memory one.
//!
//! ## Example
//!
//! ```ignore
//! use intranet_storage::{StorageError, UserRepository};
//!
//! async fn display_name(users: &dyn UserRepository, id: UserId) -> Result<String, StorageError> {
//!     users
//!         .find_user(id)
//!         .await?
//!         .map(|user| user.display_name())
//!         .ok_or_else(|| StorageError::not_found("User", id))
//! }
//! ```

mod error;
mod traits;

pub use error::{ErrorCategory, StorageError};
pub use traits::{
    BranchRepository, FilterRepository, NotificationSettingsRepository, OnboardingRepository,
    OrganizationRepository, UserRepository,
};
