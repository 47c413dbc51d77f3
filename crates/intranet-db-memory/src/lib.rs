//! In-memory repository backend for the intranet cache layer.
//!
//! [`InMemoryStore`] implements every repository trait from
//! `intranet-storage` over a single lock-protected state. It backs the
//! development server and the cache test suites, which use its per-operation
//! call counters and fault injection to observe fetches.
//!
//! # Example
//!
//! ```ignore
//! use intranet_db_memory::{InMemoryStore, Operation, UserSeed};
//! use intranet_storage::UserRepository;
//!
//! let store = InMemoryStore::new();
//! store.insert_user(UserSeed::new(1, "anna").with_language("en"));
//!
//! let user = store.find_user(UserId::new(1)).await?;
//! assert_eq!(store.calls(Operation::FindUser), 1);
//! ```

mod repositories;
pub mod seed;
pub mod storage;

pub use intranet_storage::StorageError;
pub use storage::{InMemoryStore, Operation, Role, UserSeed};

/// Type alias for a shareable in-memory store.
pub type SharedStore = std::sync::Arc<InMemoryStore>;

/// Creates an empty in-memory store.
pub fn create_store() -> SharedStore {
    std::sync::Arc::new(InMemoryStore::new())
}
