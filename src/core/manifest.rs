//! core::manifest
//!
//! Project manifest (`package.json`) access.
//!
//! The manifest supplies the project name, its version and the scripts the
//! build service may run. Only `version` is ever written back; every other
//! key, including key order, is preserved.

use std::fs;
use std::path::{Path, PathBuf};

use semver::Version;
use serde_json::Value;
use thiserror::Error;

/// Manifest file name.
pub const MANIFEST_FILE: &str = "package.json";

/// Package managers accepted in a build command.
pub const BUILD_TOOLS: &[&str] = &["npm", "cnpm", "yarn", "pnpm"];

/// Errors from manifest access.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest not found at '{0}'")]
    NotFound(PathBuf),

    #[error("failed to read manifest '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse manifest '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("manifest is missing the '{0}' field")]
    MissingField(&'static str),

    #[error("manifest version '{value}' is not valid semver: {message}")]
    InvalidVersion { value: String, message: String },

    #[error("failed to write manifest '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid build command '{0}': expected '<npm|cnpm|yarn|pnpm> run <script>'")]
    InvalidBuildCommand(String),

    #[error("build script '{0}' is not defined in the manifest scripts")]
    MissingScript(String),
}

/// Identity of the project being released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    /// Package name; also the remote repository name.
    pub name: String,
    /// Current version.
    pub version: Version,
    /// Project source directory.
    pub dir: PathBuf,
}

/// A parsed manifest document.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    doc: Value,
}

impl Manifest {
    /// Load the manifest from a project directory.
    pub fn load(dir: &Path) -> Result<Self, ManifestError> {
        let path = dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Err(ManifestError::NotFound(path));
        }
        let contents = fs::read_to_string(&path).map_err(|e| ManifestError::Read {
            path: path.clone(),
            source: e,
        })?;
        let doc: Value = serde_json::from_str(&contents).map_err(|e| ManifestError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        if !doc.is_object() {
            return Err(ManifestError::Parse {
                path,
                message: "top level is not an object".to_string(),
            });
        }
        Ok(Self { path, doc })
    }

    fn string_field(&self, field: &'static str) -> Result<&str, ManifestError> {
        self.doc
            .get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ManifestError::MissingField(field))
    }

    /// Extract the project identity.
    pub fn project(&self) -> Result<ProjectInfo, ManifestError> {
        let name = self.string_field("name")?.to_string();
        let raw = self.string_field("version")?;
        let version = Version::parse(raw).map_err(|e| ManifestError::InvalidVersion {
            value: raw.to_string(),
            message: e.to_string(),
        })?;
        let dir = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(ProjectInfo { name, version, dir })
    }

    /// Whether `scripts.<script>` is defined.
    pub fn has_script(&self, script: &str) -> bool {
        self.doc
            .get("scripts")
            .and_then(|s| s.get(script))
            .is_some()
    }

    /// Check that a build command refers to a defined script.
    pub fn check_build_command(&self, command: &str) -> Result<String, ManifestError> {
        let script = build_script(command)?;
        if !self.has_script(&script) {
            return Err(ManifestError::MissingScript(script));
        }
        Ok(script)
    }

    /// Overwrite `version` and persist the document.
    pub fn write_version(&mut self, version: &Version) -> Result<(), ManifestError> {
        if let Some(obj) = self.doc.as_object_mut() {
            obj.insert("version".to_string(), Value::String(version.to_string()));
        }
        let mut contents = serde_json::to_string_pretty(&self.doc).map_err(|e| {
            ManifestError::Parse {
                path: self.path.clone(),
                message: e.to_string(),
            }
        })?;
        contents.push('\n');
        fs::write(&self.path, contents).map_err(|e| ManifestError::Write {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// Script name targeted by a build command.
///
/// Accepts `<tool> run <script>` and `<tool> <script>` where `<tool>` is one
/// of [`BUILD_TOOLS`].
///
/// # Example
///
/// ```
/// use shipyard::core::manifest::build_script;
///
/// assert_eq!(build_script("npm run build").unwrap(), "build");
/// assert_eq!(build_script("yarn dist").unwrap(), "dist");
/// assert!(build_script("make build").is_err());
/// ```
pub fn build_script(command: &str) -> Result<String, ManifestError> {
    let parts: Vec<&str> = command.split_whitespace().collect();
    let invalid = || ManifestError::InvalidBuildCommand(command.to_string());
    match parts.as_slice() {
        [tool, "run", script] | [tool, script] if BUILD_TOOLS.contains(tool) && *script != "run" => {
            Ok((*script).to_string())
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_manifest(dir: &Path, contents: &str) {
        fs::write(dir.join(MANIFEST_FILE), contents).unwrap();
    }

    #[test]
    fn loads_project_info() {
        let dir = TempDir::new().unwrap();
        write_manifest(
            dir.path(),
            r#"{"name": "widget", "version": "1.2.3", "scripts": {"build": "vite build"}}"#,
        );
        let manifest = Manifest::load(dir.path()).unwrap();
        let project = manifest.project().unwrap();
        assert_eq!(project.name, "widget");
        assert_eq!(project.version, Version::new(1, 2, 3));
        assert_eq!(project.dir, dir.path());
        assert!(manifest.has_script("build"));
        assert!(!manifest.has_script("test"));
    }

    #[test]
    fn missing_manifest() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Manifest::load(dir.path()),
            Err(ManifestError::NotFound(_))
        ));
    }

    #[test]
    fn missing_fields() {
        let dir = TempDir::new().unwrap();
        write_manifest(dir.path(), r#"{"version": "1.0.0"}"#);
        let manifest = Manifest::load(dir.path()).unwrap();
        assert!(matches!(
            manifest.project(),
            Err(ManifestError::MissingField("name"))
        ));

        write_manifest(dir.path(), r#"{"name": "x", "version": ""}"#);
        let manifest = Manifest::load(dir.path()).unwrap();
        assert!(matches!(
            manifest.project(),
            Err(ManifestError::MissingField("version"))
        ));
    }

    #[test]
    fn invalid_version() {
        let dir = TempDir::new().unwrap();
        write_manifest(dir.path(), r#"{"name": "x", "version": "one"}"#);
        let manifest = Manifest::load(dir.path()).unwrap();
        assert!(matches!(
            manifest.project(),
            Err(ManifestError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn write_version_preserves_other_keys_in_order() {
        let dir = TempDir::new().unwrap();
        write_manifest(
            dir.path(),
            r#"{"name": "widget", "version": "1.0.0", "private": true, "scripts": {"build": "x"}}"#,
        );
        let mut manifest = Manifest::load(dir.path()).unwrap();
        manifest.write_version(&Version::new(1, 0, 1)).unwrap();

        let written = fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap();
        let name_at = written.find("\"name\"").unwrap();
        let private_at = written.find("\"private\"").unwrap();
        assert!(name_at < private_at);

        let reloaded = Manifest::load(dir.path()).unwrap().project().unwrap();
        assert_eq!(reloaded.version, Version::new(1, 0, 1));
    }

    mod build_command {
        use super::*;

        #[test]
        fn accepted_forms() {
            assert_eq!(build_script("npm run build").unwrap(), "build");
            assert_eq!(build_script("cnpm run build:prod").unwrap(), "build:prod");
            assert_eq!(build_script("pnpm  run   dist").unwrap(), "dist");
            assert_eq!(build_script("yarn build").unwrap(), "build");
        }

        #[test]
        fn rejected_forms() {
            for cmd in ["", "npm", "npm run", "make build", "npm run a b", "bun run build"] {
                assert!(build_script(cmd).is_err(), "accepted '{}'", cmd);
            }
        }

        #[test]
        fn script_must_exist() {
            let dir = TempDir::new().unwrap();
            write_manifest(
                dir.path(),
                r#"{"name": "x", "version": "1.0.0", "scripts": {"build": "tsc"}}"#,
            );
            let manifest = Manifest::load(dir.path()).unwrap();
            assert_eq!(manifest.check_build_command("npm run build").unwrap(), "build");
            assert!(matches!(
                manifest.check_build_command("npm run dist"),
                Err(ManifestError::MissingScript(s)) if s == "dist"
            ));
        }
    }
}
