//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Settings file
//!
//! Located at (in order of precedence):
//! 1. `$SHIPYARD_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/shipyard/config.toml`
//! 3. `~/.shipyard/config.toml` (canonical write location)
//!
//! # Validation
//!
//! Values are validated after parsing: timeouts must be non-zero, the stable
//! branch and remote must be non-empty, and every URL must parse.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// On-disk settings. Every field is optional; absent fields take the
/// defaults applied by [`super::Settings`].
///
/// # Example
///
/// ```toml
/// build_service_url = "ws://builds.internal:7001"
/// stable_branch = "main"
/// session_timeout_secs = 600
///
/// [forge]
/// github_api_base = "https://github.example.com/api/v3"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    /// Build service WebSocket endpoint
    pub build_service_url: Option<String>,

    /// Artifact index queried before production builds
    pub artifact_index_url: Option<String>,

    /// Long-lived integration branch
    pub stable_branch: Option<String>,

    /// Git remote the release is pushed to
    pub remote_name: Option<String>,

    /// Seconds to wait for the build service to assign a session
    pub connect_timeout_secs: Option<u64>,

    /// Seconds of build silence before the session is abandoned
    pub session_timeout_secs: Option<u64>,

    /// Default build command
    pub build_command: Option<String>,

    /// Hosting platform API endpoints
    pub forge: Option<ForgeEndpoints>,
}

/// REST API base URLs per hosting platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ForgeEndpoints {
    pub github_api_base: Option<String>,
    pub gitee_api_base: Option<String>,
}

impl SettingsFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("connect_timeout_secs", self.connect_timeout_secs),
            ("session_timeout_secs", self.session_timeout_secs),
        ] {
            if value == Some(0) {
                return Err(ConfigError::InvalidValue(format!(
                    "{} must be greater than zero",
                    field
                )));
            }
        }

        for (field, value) in [
            ("stable_branch", &self.stable_branch),
            ("remote_name", &self.remote_name),
            ("build_command", &self.build_command),
        ] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(format!(
                    "{} cannot be empty",
                    field
                )));
            }
        }

        let forge = self.forge.clone().unwrap_or_default();
        for (field, value) in [
            ("build_service_url", &self.build_service_url),
            ("artifact_index_url", &self.artifact_index_url),
            ("forge.github_api_base", &forge.github_api_base),
            ("forge.gitee_api_base", &forge.gitee_api_base),
        ] {
            if let Some(raw) = value {
                url::Url::parse(raw).map_err(|e| {
                    ConfigError::InvalidValue(format!("{} '{}' is not a URL: {}", field, raw, e))
                })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_valid() {
        let parsed: SettingsFile = toml::from_str("").unwrap();
        assert_eq!(parsed, SettingsFile::default());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn parses_all_fields() {
        let parsed: SettingsFile = toml::from_str(
            r#"
            build_service_url = "ws://builds:7001"
            artifact_index_url = "http://builds:7001/project/oss"
            stable_branch = "main"
            remote_name = "upstream"
            connect_timeout_secs = 10
            session_timeout_secs = 60
            build_command = "yarn run dist"

            [forge]
            github_api_base = "http://localhost:9000"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.stable_branch.as_deref(), Some("main"));
        assert_eq!(parsed.session_timeout_secs, Some(60));
        assert_eq!(
            parsed.forge.unwrap().github_api_base.as_deref(),
            Some("http://localhost:9000")
        );
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: Result<SettingsFile, _> = toml::from_str("trunk = \"main\"");
        assert!(result.is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let file = SettingsFile {
            connect_timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(matches!(file.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn empty_branch_rejected() {
        let file = SettingsFile {
            stable_branch: Some("  ".into()),
            ..Default::default()
        };
        assert!(file.validate().is_err());
    }

    #[test]
    fn bad_url_rejected() {
        let file = SettingsFile {
            build_service_url: Some("not a url".into()),
            ..Default::default()
        };
        let err = file.validate().unwrap_err();
        assert!(err.to_string().contains("build_service_url"));
    }
}
