//! release::error
//!
//! Aggregated error for the release engine.
//!
//! Every stage failure reaches the caller as a [`ReleaseError`]. The
//! [`ReleaseError::category`] of an error tells which family it belongs to:
//!
//! | Category | Raised by |
//! |----------|-----------|
//! | `configuration` | manifest, build command, settings, home directory |
//! | `state` | merge conflicts |
//! | `remote` | hosting platform lookups and creation |
//! | `protocol` | build session errors and timeouts |
//! | `promotion` | a failed promotion step |
//! | `cancelled` | the user declined to continue |

use thiserror::Error;

use super::promote::PromotionStep;
use crate::build::BuildError;
use crate::core::config::ConfigError;
use crate::core::manifest::ManifestError;
use crate::core::version::PolicyError;
use crate::forge::ForgeError;
use crate::git::GitError;
use crate::store::StoreError;
use crate::ui::prompts::PromptError;

/// Errors from a publish run.
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Settings(#[from] ConfigError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("unresolved merge conflicts in: {}", .paths.join(", "))]
    Conflicts { paths: Vec<String> },

    #[error("remote error: {0}")]
    Remote(#[from] ForgeError),

    #[error("build session error: {0}")]
    Protocol(#[from] BuildError),

    #[error("promotion failed at '{}': {source}", .step.label())]
    Promotion {
        step: PromotionStep,
        completed: Vec<PromotionStep>,
        source: GitError,
    },

    #[error("cancelled: {0}")]
    Cancelled(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Prompt(PromptError),

    #[error(transparent)]
    Git(GitError),
}

impl ReleaseError {
    /// Error family name.
    pub fn category(&self) -> &'static str {
        match self {
            ReleaseError::Configuration(_)
            | ReleaseError::Manifest(_)
            | ReleaseError::Settings(_)
            | ReleaseError::Policy(_) => "configuration",
            ReleaseError::Conflicts { .. } => "state",
            ReleaseError::Remote(_) => "remote",
            ReleaseError::Protocol(_) => "protocol",
            ReleaseError::Promotion { .. } => "promotion",
            ReleaseError::Cancelled(_) => "cancelled",
            ReleaseError::Store(_) => "store",
            ReleaseError::Prompt(_) => "prompt",
            ReleaseError::Git(_) => "git",
        }
    }
}

impl From<GitError> for ReleaseError {
    fn from(e: GitError) -> Self {
        match e {
            GitError::Conflicts { paths } => ReleaseError::Conflicts { paths },
            other => ReleaseError::Git(other),
        }
    }
}

impl From<PromptError> for ReleaseError {
    fn from(e: PromptError) -> Self {
        match e {
            PromptError::Cancelled => ReleaseError::Cancelled("prompt dismissed".to_string()),
            other => ReleaseError::Prompt(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_become_state_errors() {
        let err: ReleaseError = GitError::Conflicts {
            paths: vec!["a.txt".into(), "b.txt".into()],
        }
        .into();
        assert_eq!(err.category(), "state");
        assert_eq!(err.to_string(), "unresolved merge conflicts in: a.txt, b.txt");
    }

    #[test]
    fn other_git_errors_stay_git() {
        let err: ReleaseError = GitError::BareRepo.into();
        assert_eq!(err.category(), "git");
    }

    #[test]
    fn categories() {
        assert_eq!(
            ReleaseError::from(ForgeError::AuthFailed("bad token".into())).category(),
            "remote"
        );
        assert_eq!(
            ReleaseError::from(BuildError::Remote("x".into())).category(),
            "protocol"
        );
        assert_eq!(
            ReleaseError::from(ManifestError::MissingField("name")).category(),
            "configuration"
        );
        assert_eq!(
            ReleaseError::from(PromptError::Cancelled).category(),
            "cancelled"
        );
        assert_eq!(
            ReleaseError::from(PromptError::NotInteractive("Token".into())).category(),
            "prompt"
        );
    }

    #[test]
    fn promotion_names_the_step() {
        let err = ReleaseError::Promotion {
            step: PromotionStep::PushStable,
            completed: vec![PromotionStep::ReplaceTag, PromotionStep::CreateTag],
            source: GitError::CommandFailed {
                command: "push origin master".into(),
                stderr: "rejected".into(),
            },
        };
        assert_eq!(err.category(), "promotion");
        assert!(err.to_string().contains(PromotionStep::PushStable.label()));
    }
}
