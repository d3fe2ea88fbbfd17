//! store::file_store
//!
//! File-based record storage.
//!
//! # Layout
//!
//! One flat value per file under the store directory (`~/.shipyard/git/`
//! by default), named by [`ConfigKey::file_name`].
//!
//! # Security
//!
//! - The token file is created with 0600 permissions on Unix
//! - All writes are atomic (write to temp file, then rename)
//! - Values are NEVER logged, printed, or included in error messages
//!
//! # Example
//!
//! ```no_run
//! use shipyard::store::{ConfigKey, ConfigStore, FileConfigStore};
//! use std::path::PathBuf;
//!
//! let store = FileConfigStore::new(PathBuf::from("/home/ada/.shipyard/git"));
//! store.set(ConfigKey::HostPlatform, "github").unwrap();
//! assert_eq!(store.get(ConfigKey::HostPlatform).unwrap().as_deref(), Some("github"));
//! ```

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use super::traits::{ConfigKey, ConfigStore, StoreError};

/// File-based record storage.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    dir: PathBuf,
}

impl FileConfigStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn path_of(&self, key: ConfigKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    fn write_error(key: ConfigKey, what: &str, e: std::io::Error) -> StoreError {
        StoreError::WriteError {
            key,
            message: format!("{}: {}", what, e),
        }
    }
}

impl ConfigStore for FileConfigStore {
    fn get(&self, key: ConfigKey) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_of(key)) {
            Ok(content) => {
                let value = content.trim();
                Ok((!value.is_empty()).then(|| value.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::ReadError {
                key,
                message: e.to_string(),
            }),
        }
    }

    fn set(&self, key: ConfigKey, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| Self::write_error(key, "cannot create directory", e))?;

        let path = self.path_of(key);
        let temp_path = self.dir.join(format!("{}.tmp", key.file_name()));

        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| Self::write_error(key, "cannot create temp file", e))?;

            // Restrict before the secret touches disk
            #[cfg(unix)]
            {
                if key.is_secret() {
                    file.set_permissions(fs::Permissions::from_mode(0o600))
                        .map_err(|e| Self::write_error(key, "cannot set permissions", e))?;
                }
            }

            file.write_all(value.trim().as_bytes())
                .map_err(|e| Self::write_error(key, "cannot write", e))?;
            file.sync_all()
                .map_err(|e| Self::write_error(key, "cannot sync to disk", e))?;
        }

        fs::rename(&temp_path, &path)
            .map_err(|e| Self::write_error(key, "cannot rename temp file", e))?;

        tracing::debug!(key = %key, "stored record");
        Ok(())
    }

    fn delete(&self, key: ConfigKey) -> Result<(), StoreError> {
        match fs::remove_file(self.path_of(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::DeleteError {
                key,
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, FileConfigStore) {
        let temp = TempDir::new().expect("create temp dir");
        let store = FileConfigStore::new(temp.path().join("git"));
        (temp, store)
    }

    #[test]
    fn get_nonexistent_returns_none() {
        let (_temp, store) = create_test_store();
        assert!(store.get(ConfigKey::Login).expect("get").is_none());
    }

    #[test]
    fn set_and_get() {
        let (_temp, store) = create_test_store();
        store.set(ConfigKey::HostPlatform, "gitee").expect("set");
        assert_eq!(
            store.get(ConfigKey::HostPlatform).expect("get").as_deref(),
            Some("gitee")
        );
        assert!(store.path_of(ConfigKey::HostPlatform).ends_with("git/.git_server"));
    }

    #[test]
    fn set_overwrites() {
        let (_temp, store) = create_test_store();
        store.set(ConfigKey::Login, "first").expect("first set");
        store.set(ConfigKey::Login, "second").expect("second set");
        assert_eq!(
            store.get(ConfigKey::Login).expect("get").as_deref(),
            Some("second")
        );
    }

    #[test]
    fn values_are_trimmed_and_blank_is_absent() {
        let (_temp, store) = create_test_store();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.path_of(ConfigKey::OwnerKind), "org\n").unwrap();
        fs::write(store.path_of(ConfigKey::Login), "  \n").unwrap();
        assert_eq!(
            store.get(ConfigKey::OwnerKind).unwrap().as_deref(),
            Some("org")
        );
        assert_eq!(store.get(ConfigKey::Login).unwrap(), None);
    }

    #[test]
    fn delete_is_idempotent() {
        let (_temp, store) = create_test_store();
        store.set(ConfigKey::Token, "secret").expect("set");
        store.delete(ConfigKey::Token).expect("delete");
        store.delete(ConfigKey::Token).expect("delete again");
        assert!(!store.exists(ConfigKey::Token).unwrap());
    }

    #[test]
    fn no_temp_file_left_behind() {
        let (_temp, store) = create_test_store();
        store.set(ConfigKey::PublishTarget, "oss").expect("set");
        let names: Vec<_> = fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec![".git_publish".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_private() {
        let (_temp, store) = create_test_store();
        store.set(ConfigKey::Token, "secret").expect("set");
        let mode = fs::metadata(store.path_of(ConfigKey::Token))
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(mode, 0o600);
    }
}
