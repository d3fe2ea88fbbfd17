//! store::traits
//!
//! Release record storage trait definition.
//!
//! # Design
//!
//! The `ConfigStore` trait is a small key-value interface over a fixed set
//! of [`ConfigKey`]s. A record, once written, is trusted until it is
//! explicitly overwritten or deleted; there is no expiry.
//!
//! # Security
//!
//! Implementations MUST:
//! - Never log, print, or include the token value in error messages
//! - Be thread-safe (Send + Sync)

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors from record storage operations.
///
/// Note: Error messages intentionally do not include stored values.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read from the store.
    #[error("failed to read '{key}': {message}")]
    ReadError { key: ConfigKey, message: String },

    /// Failed to write to the store.
    #[error("failed to write '{key}': {message}")]
    WriteError { key: ConfigKey, message: String },

    /// Failed to delete from the store.
    #[error("failed to delete '{key}': {message}")]
    DeleteError { key: ConfigKey, message: String },

    /// The store location could not be determined.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Unknown key name.
    #[error("unknown config key '{0}' (valid: {keys})", keys = ConfigKey::names().join(", "))]
    UnknownKey(String),
}

/// The fixed set of cached release records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigKey {
    /// Chosen hosting platform.
    HostPlatform,
    /// Hosting platform access token.
    Token,
    /// Owner kind (user or org).
    OwnerKind,
    /// Owner login name.
    Login,
    /// Ignore-file template.
    IgnoreTemplate,
    /// Chosen publish target.
    PublishTarget,
}

impl ConfigKey {
    /// All keys, in listing order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::HostPlatform,
            ConfigKey::Token,
            ConfigKey::OwnerKind,
            ConfigKey::Login,
            ConfigKey::IgnoreTemplate,
            ConfigKey::PublishTarget,
        ]
    }

    /// User-facing names accepted by `config reset`.
    pub fn names() -> Vec<&'static str> {
        Self::all().iter().map(ConfigKey::name).collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::HostPlatform => "server",
            ConfigKey::Token => "token",
            ConfigKey::OwnerKind => "owner",
            ConfigKey::Login => "login",
            ConfigKey::IgnoreTemplate => "gitignore",
            ConfigKey::PublishTarget => "publish",
        }
    }

    /// File name under the store directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            ConfigKey::HostPlatform => ".git_server",
            ConfigKey::Token => ".git_token",
            ConfigKey::OwnerKind => ".git_own",
            ConfigKey::Login => ".git_login",
            ConfigKey::IgnoreTemplate => ".gitignore",
            ConfigKey::PublishTarget => ".git_publish",
        }
    }

    /// Whether the value must never be displayed.
    pub fn is_secret(&self) -> bool {
        matches!(self, ConfigKey::Token)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.name() == s || k.file_name() == s)
            .ok_or_else(|| StoreError::UnknownKey(s.to_string()))
    }
}

/// Trait for release record storage.
///
/// Implementations must be thread-safe (Send + Sync) and must never
/// log, print, or include the token in error messages.
pub trait ConfigStore: Send + Sync {
    /// Get a record.
    ///
    /// Returns `Ok(None)` if the record does not exist or is blank.
    /// Values are returned trimmed.
    fn get(&self, key: ConfigKey) -> Result<Option<String>, StoreError>;

    /// Set a record, overwriting any existing value.
    fn set(&self, key: ConfigKey, value: &str) -> Result<(), StoreError>;

    /// Delete a record.
    ///
    /// Returns `Ok(())` even if the record did not exist.
    fn delete(&self, key: ConfigKey) -> Result<(), StoreError>;

    /// Check if a record exists.
    ///
    /// Default implementation uses `get()` and checks for `Some`.
    fn exists(&self, key: ConfigKey) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}
