//! release::context
//!
//! Values threaded from one publish stage to the next.
//!
//! Each stage takes the outputs of the stages before it and returns its
//! own; nothing is accumulated in shared mutable state.

use std::fmt;
use std::path::PathBuf;

use crate::build::BuildOutcome;
use crate::core::types::{BranchVersion, OwnerKind, RepoRecord};
use crate::core::version::BumpKind;
use crate::forge::{ForgeProvider, Organization, RemoteUser};

use super::promote::PromotionStep;

/// Options for one publish run.
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    /// Project directory.
    pub dir: PathBuf,
    /// Re-ask for the hosting platform.
    pub refresh_server: bool,
    /// Re-ask for the access token.
    pub refresh_token: bool,
    /// Re-ask for the repository owner.
    pub refresh_owner: bool,
    /// Build command; the configured default when `None`.
    pub build_cmd: Option<String>,
    /// Production release: confirm artifact overwrite and promote on success.
    pub prod: bool,
    /// Stop after the working branch is pushed.
    pub skip_build: bool,
}

/// Hosting platform and the token used with it.
#[derive(Clone)]
pub struct Credentials {
    pub provider: ForgeProvider,
    pub token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("provider", &self.provider)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// The authenticated account and its organizations.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: RemoteUser,
    pub orgs: Vec<Organization>,
}

/// Who owns the remote repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub kind: OwnerKind,
    pub login: String,
}

/// The remote repository the project is published to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub provider: ForgeProvider,
    pub owner: Owner,
    pub repo: RepoRecord,
    /// Whether this run created the repository.
    pub created: bool,
    pub clone_url: String,
}

/// Result of the commit phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    pub release: BranchVersion,
    /// Set when the version was bumped past an existing release.
    pub bump: Option<BumpKind>,
}

/// Summary of a publish run.
#[derive(Debug, Clone)]
pub struct PublishReport {
    pub target: RemoteTarget,
    pub commit: CommitResult,
    /// `None` when the build was skipped.
    pub build: Option<BuildOutcome>,
    /// Completed promotion steps; empty unless a production build succeeded.
    pub promoted: Vec<PromotionStep>,
}

impl PublishReport {
    /// Whether the run did everything it was asked to.
    pub fn is_success(&self) -> bool {
        self.build.as_ref().map_or(true, |b| b.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_hides_token() {
        let creds = Credentials {
            provider: ForgeProvider::GitHub,
            token: "ghp_secret".into(),
        };
        let shown = format!("{:?}", creds);
        assert!(!shown.contains("ghp_secret"));
        assert!(shown.contains("GitHub"));
    }
}
