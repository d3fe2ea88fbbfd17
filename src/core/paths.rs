//! core::paths
//!
//! Centralized path routing for per-user storage.
//!
//! # Storage Layout
//!
//! All shipyard data lives under the cache directory, `$SHIPYARD_HOME` when
//! set and `~/.shipyard` otherwise:
//! - `config.toml` - Settings (see [`crate::core::config`])
//! - `git/` - Cached release records, one file per key
//!
//! # Example
//!
//! ```
//! use shipyard::core::paths::ShipyardPaths;
//! use std::path::PathBuf;
//!
//! let paths = ShipyardPaths::new(PathBuf::from("/home/ada/.shipyard"));
//! assert_eq!(paths.store_dir(), PathBuf::from("/home/ada/.shipyard/git"));
//! ```

use std::path::{Path, PathBuf};

use super::config::ConfigError;

/// Environment variable overriding the cache directory.
pub const HOME_ENV: &str = "SHIPYARD_HOME";

/// Name of the cache directory under the user's home.
pub const CACHE_DIR_NAME: &str = ".shipyard";

/// Subdirectory holding the release record store.
pub const STORE_DIR_NAME: &str = "git";

/// Per-user storage locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipyardPaths {
    /// Root of the cache directory.
    pub cache_dir: PathBuf,
}

impl ShipyardPaths {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Resolve from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoHomeDir` when neither `$SHIPYARD_HOME` nor a
    /// home directory is available.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(PathBuf::from(dir)));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(Self::new(home.join(CACHE_DIR_NAME)))
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Directory of the release record store (`<cache>/git`).
    pub fn store_dir(&self) -> PathBuf {
        self.cache_dir.join(STORE_DIR_NAME)
    }

    /// Settings file inside the cache directory.
    pub fn settings_path(&self) -> PathBuf {
        self.cache_dir.join("config.toml")
    }
}
