//! core::version
//!
//! Version and working-branch policy.
//!
//! # Algorithm
//!
//! 1. Scan remote tag refs for `refs/tags/release/<semver>` and keep the
//!    greatest valid version.
//! 2. No release yet, or the local version is strictly greater: work on
//!    `dev/<local>`.
//! 3. Otherwise the caller must pick a [`BumpKind`]; the new version is the
//!    latest release incremented by that kind.
//!
//! The policy never returns a version lower than or equal to an existing
//! release unless it is the local version and no release exists.

use std::fmt;

use semver::{BuildMetadata, Prerelease, Version};
use thiserror::Error;

use super::types::{BranchVersion, RELEASE_TAG_PREFIX};

/// Errors from the version policy.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("cannot apply a {kind} bump to {version}: the {kind} component is at its maximum")]
    VersionOverflow { version: String, kind: BumpKind },
}

/// Which semver component to increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpKind {
    Patch,
    Minor,
    Major,
}

impl BumpKind {
    /// All kinds, in prompt order.
    pub fn all() -> &'static [BumpKind] {
        &[BumpKind::Patch, BumpKind::Minor, BumpKind::Major]
    }

    pub fn name(&self) -> &'static str {
        match self {
            BumpKind::Patch => "patch",
            BumpKind::Minor => "minor",
            BumpKind::Major => "major",
        }
    }

    /// Increment `version` by this kind.
    ///
    /// Matches npm semver `inc`: a prerelease of the target release is
    /// promoted to that release rather than skipped past. Fails when the
    /// incremented component would overflow.
    pub fn apply(&self, version: &Version) -> Result<Version, PolicyError> {
        let pre = !version.pre.is_empty();
        let inc = |component: u64| {
            component
                .checked_add(1)
                .ok_or_else(|| PolicyError::VersionOverflow {
                    version: version.to_string(),
                    kind: *self,
                })
        };
        let mut next = match self {
            BumpKind::Patch if pre => Version::new(version.major, version.minor, version.patch),
            BumpKind::Patch => Version::new(version.major, version.minor, inc(version.patch)?),
            BumpKind::Minor if pre && version.patch == 0 => {
                Version::new(version.major, version.minor, 0)
            }
            BumpKind::Minor => Version::new(version.major, inc(version.minor)?, 0),
            BumpKind::Major if pre && version.minor == 0 && version.patch == 0 => {
                Version::new(version.major, 0, 0)
            }
            BumpKind::Major => Version::new(inc(version.major)?, 0, 0),
        };
        next.pre = Prerelease::EMPTY;
        next.build = BuildMetadata::EMPTY;
        Ok(next)
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Outcome of comparing the local version with the latest release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Work on `dev/<local>` as is.
    UseLocal(BranchVersion),
    /// The latest release is not behind the local version; a bump is needed.
    NeedsBump {
        /// The latest released version the bump is computed from.
        release: Version,
    },
}

/// Extract the version from a release tag ref.
///
/// Accepts both `refs/tags/release/<v>` and `release/<v>`.
pub fn release_version_of(refname: &str) -> Option<Version> {
    let short = refname.strip_prefix("refs/tags/").unwrap_or(refname);
    let raw = short.strip_prefix(RELEASE_TAG_PREFIX)?;
    Version::parse(raw).ok()
}

/// The greatest release version among `refs`.
///
/// Invalid tags are ignored. Equal versions collapse to one.
pub fn latest_release<'a, I>(refs: I) -> Option<Version>
where
    I: IntoIterator<Item = &'a str>,
{
    refs.into_iter().filter_map(release_version_of).max()
}

/// Decide the working branch for `local` given the latest release.
pub fn decide(local: &Version, release: Option<&Version>) -> Decision {
    match release {
        None => Decision::UseLocal(BranchVersion::working(local.clone())),
        Some(release) if local > release => {
            Decision::UseLocal(BranchVersion::working(local.clone()))
        }
        Some(release) => Decision::NeedsBump {
            release: release.clone(),
        },
    }
}

/// Working branch after bumping `release` by `kind`.
pub fn bumped(release: &Version, kind: BumpKind) -> Result<BranchVersion, PolicyError> {
    kind.apply(release).map(BranchVersion::working)
}
