//! release::promote
//!
//! Release promotion: tag, merge into the stable branch, retire the
//! working branch.
//!
//! Steps run in [`PromotionStep::all`] order. The first failing step stops
//! the run; steps already applied stay applied so the promotion can be
//! re-run after fixing the cause. Tag replacement is idempotent, so a re-run
//! leaves exactly one local and one remote `release/<version>` tag.

use std::fmt;

use super::error::ReleaseError;
use crate::core::types::BranchVersion;
use crate::git::{Git, GitError};
use crate::ui::output::Reporter;

/// One promotion step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionStep {
    ReplaceTag,
    CreateTag,
    CheckoutStable,
    MergeWorking,
    PushStable,
    DeleteLocalBranch,
    DeleteRemoteBranch,
}

impl PromotionStep {
    /// Every step, in execution order.
    pub fn all() -> &'static [PromotionStep] {
        &[
            PromotionStep::ReplaceTag,
            PromotionStep::CreateTag,
            PromotionStep::CheckoutStable,
            PromotionStep::MergeWorking,
            PromotionStep::PushStable,
            PromotionStep::DeleteLocalBranch,
            PromotionStep::DeleteRemoteBranch,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            PromotionStep::ReplaceTag => "Remove previous release tag",
            PromotionStep::CreateTag => "Create release tag",
            PromotionStep::CheckoutStable => "Check out stable branch",
            PromotionStep::MergeWorking => "Merge working branch",
            PromotionStep::PushStable => "Push stable branch",
            PromotionStep::DeleteLocalBranch => "Delete local working branch",
            PromotionStep::DeleteRemoteBranch => "Delete remote working branch",
        }
    }
}

impl fmt::Display for PromotionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Promotion of one working branch.
#[derive(Debug)]
pub struct Promotion<'a> {
    git: &'a Git,
    remote: &'a str,
    stable: &'a str,
    release: &'a BranchVersion,
}

impl<'a> Promotion<'a> {
    pub fn new(git: &'a Git, remote: &'a str, stable: &'a str, release: &'a BranchVersion) -> Self {
        Self {
            git,
            remote,
            stable,
            release,
        }
    }

    /// Run every step, reporting each one.
    ///
    /// Returns the completed steps, or [`ReleaseError::Promotion`] naming
    /// the failed step and those completed before it.
    pub fn run(&self, reporter: &dyn Reporter) -> Result<Vec<PromotionStep>, ReleaseError> {
        let mut completed = Vec::new();
        for step in PromotionStep::all() {
            tracing::info!(step = %step, release = %self.release, "promotion step");
            reporter.stage(step.label());
            match self.apply(*step) {
                Ok(detail) => {
                    reporter.success(step.label(), &detail);
                    completed.push(*step);
                }
                Err(source) => {
                    reporter.failure(step.label(), &source.to_string());
                    return Err(ReleaseError::Promotion {
                        step: *step,
                        completed,
                        source,
                    });
                }
            }
        }
        Ok(completed)
    }

    fn apply(&self, step: PromotionStep) -> Result<String, GitError> {
        let tag = self.release.tag();
        let branch = self.release.branch();
        match step {
            PromotionStep::ReplaceTag => {
                let remote_ref = format!("refs/tags/{}", tag);
                let on_remote = self
                    .git
                    .ls_remote_refs(self.remote)?
                    .iter()
                    .any(|r| *r == remote_ref);
                if on_remote {
                    self.git.delete_remote_ref(self.remote, &remote_ref)?;
                }
                self.git.delete_local_tag(&tag)?;
                Ok(if on_remote {
                    format!("removed {}", tag)
                } else {
                    "nothing to remove".to_string()
                })
            }
            PromotionStep::CreateTag => {
                self.git.tag(&tag)?;
                self.git.push_tags(self.remote)?;
                Ok(tag)
            }
            PromotionStep::CheckoutStable => {
                self.git.checkout(self.stable)?;
                Ok(self.stable.to_string())
            }
            PromotionStep::MergeWorking => {
                self.git.merge(branch)?;
                Ok(format!("{} -> {}", branch, self.stable))
            }
            PromotionStep::PushStable => {
                self.git.push(self.remote, self.stable)?;
                Ok(format!("{}/{}", self.remote, self.stable))
            }
            PromotionStep::DeleteLocalBranch => {
                self.git.delete_local_branch(branch)?;
                Ok(branch.to_string())
            }
            PromotionStep::DeleteRemoteBranch => {
                if self.git.remote_branch_exists(self.remote, branch)? {
                    self.git
                        .delete_remote_ref(self.remote, &format!("refs/heads/{}", branch))?;
                }
                Ok(format!("{}/{}", self.remote, branch))
            }
        }
    }
}
