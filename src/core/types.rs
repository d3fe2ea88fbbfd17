//! core::types
//!
//! Strong types for release domain concepts.
//!
//! # Types
//!
//! - [`BranchVersion`] - Working branch name derived from a semantic version
//! - [`OwnerKind`] - Whether a repository belongs to a user or an organization
//! - [`PublishTarget`] - Where the build service publishes artifacts
//! - [`RepoRecord`] - Remote repository descriptor
//!
//! # Validation
//!
//! Branch names are never set directly. A [`BranchVersion`] is always derived
//! from a version, so the `dev/<version>` shape cannot be violated.
//!
//! # Examples
//!
//! ```
//! use shipyard::core::types::BranchVersion;
//!
//! let bv = BranchVersion::working(semver::Version::new(1, 2, 3));
//! assert_eq!(bv.branch(), "dev/1.2.3");
//! assert_eq!(bv.tag(), "release/1.2.3");
//! ```

use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of working branches.
pub const WORKING_BRANCH_PREFIX: &str = "dev/";

/// Prefix of release tags.
pub const RELEASE_TAG_PREFIX: &str = "release/";

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid owner kind: {0} (expected 'user' or 'org')")]
    InvalidOwnerKind(String),

    #[error("invalid publish target: {0}")]
    InvalidPublishTarget(String),
}

/// A working branch paired with the version it carries.
///
/// The branch name is always `dev/<version>`. After promotion the release
/// lives on the stable branch and is marked by the `release/<version>` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchVersion {
    version: Version,
    branch: String,
}

impl BranchVersion {
    /// Derive the working branch for a version.
    pub fn working(version: Version) -> Self {
        let branch = format!("{}{}", WORKING_BRANCH_PREFIX, version);
        Self { version, branch }
    }

    /// The semantic version carried by the branch.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// The working branch name (`dev/<version>`).
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// The release tag name for this version (`release/<version>`).
    pub fn tag(&self) -> String {
        format!("{}{}", RELEASE_TAG_PREFIX, self.version)
    }
}

impl fmt::Display for BranchVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.branch)
    }
}

/// Who owns the remote repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    /// The authenticated user's own namespace.
    User,
    /// An organization the user belongs to.
    Org,
}

impl OwnerKind {
    /// Value written to the config cache.
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::User => "user",
            OwnerKind::Org => "org",
        }
    }

    /// Label shown in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            OwnerKind::User => "Personal",
            OwnerKind::Org => "Organization",
        }
    }

    /// Parse the cached value.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        match s.trim() {
            "user" => Ok(OwnerKind::User),
            "org" => Ok(OwnerKind::Org),
            other => Err(TypeError::InvalidOwnerKind(other.to_string())),
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the build service publishes finished artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishTarget {
    /// Object storage bucket.
    Oss,
}

impl PublishTarget {
    /// All supported targets.
    pub fn all() -> &'static [PublishTarget] {
        &[PublishTarget::Oss]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PublishTarget::Oss => "oss",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PublishTarget::Oss => "OSS",
        }
    }

    pub fn parse(s: &str) -> Result<Self, TypeError> {
        match s.trim() {
            "oss" => Ok(PublishTarget::Oss),
            other => Err(TypeError::InvalidPublishTarget(other.to_string())),
        }
    }
}

impl fmt::Display for PublishTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Remote repository descriptor.
///
/// `exists` is false only between a lookup that confirmed absence and the
/// subsequent creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRecord {
    /// Owner login (user or organization).
    pub login: String,
    /// Repository name.
    pub name: String,
    /// Whether the repository exists on the remote.
    pub exists: bool,
}

impl RepoRecord {
    /// `owner/name` form.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.login, self.name)
    }
}
