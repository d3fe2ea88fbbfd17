//! core::config
//!
//! Settings schema and loading.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Settings file
//! 3. CLI flags (not handled here)
//!
//! # Locations
//!
//! Searched in order:
//! 1. `$SHIPYARD_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/shipyard/config.toml`
//! 3. `~/.shipyard/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use shipyard::core::config::Settings;
//!
//! let settings = Settings::load().unwrap().settings;
//! println!("Stable branch: {}", settings.stable_branch());
//! println!("Build service: {}", settings.build_service_url());
//! ```

pub mod schema;

pub use schema::{ForgeEndpoints, SettingsFile};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Default build service endpoint.
pub const DEFAULT_BUILD_SERVICE_URL: &str = "ws://127.0.0.1:7001";
/// Default artifact index endpoint.
pub const DEFAULT_ARTIFACT_INDEX_URL: &str = "http://127.0.0.1:7001/project/oss";
/// Default stable branch.
pub const DEFAULT_STABLE_BRANCH: &str = "master";
/// Default remote.
pub const DEFAULT_REMOTE: &str = "origin";
/// Default build command.
pub const DEFAULT_BUILD_COMMAND: &str = "npm run build";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 5 * 60;
pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_GITEE_API_BASE: &str = "https://gitee.com/api/v5";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Result of loading settings.
#[derive(Debug)]
pub struct SettingsLoadResult {
    /// The loaded settings.
    pub settings: Settings,
    /// The file the settings came from, if any.
    pub path: Option<PathBuf>,
}

/// Resolved settings with defaults applied through accessors.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub file: SettingsFile,
}

impl Settings {
    /// Wrap an already parsed file.
    pub fn from_file(file: SettingsFile) -> Result<Self, ConfigError> {
        file.validate()?;
        Ok(Self { file })
    }

    /// Load settings from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file exists but cannot be parsed or
    /// fails validation. A missing file is not an error.
    pub fn load() -> Result<SettingsLoadResult, ConfigError> {
        match Self::locate() {
            Some(path) => {
                let file = Self::read_file(&path)?;
                Ok(SettingsLoadResult {
                    settings: Self::from_file(file)?,
                    path: Some(path),
                })
            }
            None => Ok(SettingsLoadResult {
                settings: Settings::default(),
                path: None,
            }),
        }
    }

    /// Find the first existing settings file.
    fn locate() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("SHIPYARD_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("shipyard/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        let path = dirs::home_dir()?.join(".shipyard/config.toml");
        path.exists().then_some(path)
    }

    /// Read and parse a settings file.
    pub fn read_file(path: &Path) -> Result<SettingsFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Canonical path for the settings file (`~/.shipyard/config.toml`).
    pub fn canonical_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".shipyard/config.toml"))
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    pub fn build_service_url(&self) -> &str {
        self.file
            .build_service_url
            .as_deref()
            .unwrap_or(DEFAULT_BUILD_SERVICE_URL)
    }

    pub fn artifact_index_url(&self) -> &str {
        self.file
            .artifact_index_url
            .as_deref()
            .unwrap_or(DEFAULT_ARTIFACT_INDEX_URL)
    }

    /// Long-lived integration branch.
    ///
    /// Defaults to "master" if not configured.
    pub fn stable_branch(&self) -> &str {
        self.file
            .stable_branch
            .as_deref()
            .unwrap_or(DEFAULT_STABLE_BRANCH)
    }

    /// Git remote name.
    ///
    /// Defaults to "origin" if not configured.
    pub fn remote_name(&self) -> &str {
        self.file.remote_name.as_deref().unwrap_or(DEFAULT_REMOTE)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.file
                .connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(
            self.file
                .session_timeout_secs
                .unwrap_or(DEFAULT_SESSION_TIMEOUT_SECS),
        )
    }

    pub fn build_command(&self) -> &str {
        self.file
            .build_command
            .as_deref()
            .unwrap_or(DEFAULT_BUILD_COMMAND)
    }

    pub fn github_api_base(&self) -> &str {
        self.file
            .forge
            .as_ref()
            .and_then(|f| f.github_api_base.as_deref())
            .unwrap_or(DEFAULT_GITHUB_API_BASE)
    }

    pub fn gitee_api_base(&self) -> &str {
        self.file
            .forge
            .as_ref()
            .and_then(|f| f.gitee_api_base.as_deref())
            .unwrap_or(DEFAULT_GITEE_API_BASE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.build_service_url(), "ws://127.0.0.1:7001");
        assert_eq!(
            settings.artifact_index_url(),
            "http://127.0.0.1:7001/project/oss"
        );
        assert_eq!(settings.stable_branch(), "master");
        assert_eq!(settings.remote_name(), "origin");
        assert_eq!(settings.connect_timeout(), Duration::from_secs(5));
        assert_eq!(settings.session_timeout(), Duration::from_secs(300));
        assert_eq!(settings.build_command(), "npm run build");
        assert_eq!(settings.github_api_base(), "https://api.github.com");
        assert_eq!(settings.gitee_api_base(), "https://gitee.com/api/v5");
    }

    #[test]
    fn file_values_override_defaults() {
        let settings = Settings::from_file(SettingsFile {
            stable_branch: Some("main".into()),
            session_timeout_secs: Some(30),
            forge: Some(ForgeEndpoints {
                gitee_api_base: Some("http://127.0.0.1:1234".into()),
                ..Default::default()
            }),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(settings.stable_branch(), "main");
        assert_eq!(settings.session_timeout(), Duration::from_secs(30));
        assert_eq!(settings.gitee_api_base(), "http://127.0.0.1:1234");
        assert_eq!(settings.github_api_base(), DEFAULT_GITHUB_API_BASE);
    }

    #[test]
    fn from_file_validates() {
        let result = Settings::from_file(SettingsFile {
            session_timeout_secs: Some(0),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    mod read_file {
        use super::*;

        #[test]
        fn reads_valid_file() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("config.toml");
            fs::write(&path, "remote_name = \"upstream\"\n").unwrap();
            let file = Settings::read_file(&path).unwrap();
            assert_eq!(file.remote_name.as_deref(), Some("upstream"));
        }

        #[test]
        fn reports_parse_errors_with_path() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("config.toml");
            fs::write(&path, "remote_name = [").unwrap();
            match Settings::read_file(&path) {
                Err(ConfigError::ParseError { path: p, .. }) => assert_eq!(p, path),
                other => panic!("expected parse error, got {:?}", other),
            }
        }

        #[test]
        fn missing_file_is_read_error() {
            let dir = TempDir::new().unwrap();
            let result = Settings::read_file(&dir.path().join("nope.toml"));
            assert!(matches!(result, Err(ConfigError::ReadError { .. })));
        }
    }
}
