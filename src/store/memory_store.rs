//! store::memory_store
//!
//! In-memory record storage for tests and dry runs.

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::traits::{ConfigKey, ConfigStore, StoreError};

/// In-memory record storage.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    values: Mutex<BTreeMap<ConfigKey, String>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a record.
    pub fn with(self, key: ConfigKey, value: &str) -> Self {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key, value.to_string());
        }
        self
    }

    fn poisoned(key: ConfigKey) -> StoreError {
        StoreError::ReadError {
            key,
            message: "store lock poisoned".to_string(),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: ConfigKey) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().map_err(|_| Self::poisoned(key))?;
        Ok(values
            .get(&key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    fn set(&self, key: ConfigKey, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| Self::poisoned(key))?;
        values.insert(key, value.trim().to_string());
        Ok(())
    }

    fn delete(&self, key: ConfigKey) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| Self::poisoned(key))?;
        values.remove(&key);
        Ok(())
    }
}
