//! Backend wiring for the in-memory store.

use intranet_cache::Repositories;
use intranet_db_memory::{SharedStore, create_store, seed::seed_demo};
use intranet_storage::StorageError;
use tracing::info;

use crate::config::AppConfig;

/// Creates the in-memory store, seeded with demo data when
/// `server.seed_demo_data` is set, and the repositories over it.
pub fn memory_repositories(
    config: &AppConfig,
) -> Result<(SharedStore, Repositories), StorageError> {
    let store = create_store();
    if config.server.seed_demo_data {
        seed_demo(&store)?;
        info!("Demo data loaded into the in-memory store");
    }
    let repositories = Repositories::from_backend(store.clone());
    Ok((store, repositories))
}
