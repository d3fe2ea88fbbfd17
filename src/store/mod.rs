//! store
//!
//! Per-user cache of release records (hosting platform, token, owner,
//! login, ignore template, publish target).
//!
//! # Architecture
//!
//! Records go through the [`ConfigStore`] trait:
//!
//! - [`FileConfigStore`]: One file per key under `~/.shipyard/git/` (default)
//! - [`MemoryConfigStore`]: In-memory, for tests
//!
//! The cache directory is last-writer-wins; concurrent runs may overwrite
//! each other's records.

mod file_store;
mod memory_store;
mod traits;

pub use file_store::FileConfigStore;
pub use memory_store::MemoryConfigStore;
pub use traits::{ConfigKey, ConfigStore, StoreError};

use crate::core::paths::ShipyardPaths;

/// Create the default file store for the given paths.
pub fn default_store(paths: &ShipyardPaths) -> FileConfigStore {
    FileConfigStore::new(paths.store_dir())
}
