//! release::local
//!
//! Local repository reconciliation.
//!
//! # First run
//!
//! A project without git metadata is initialized on the stable branch,
//! pointed at the remote repository and given an initial commit. If the
//! remote already has a stable branch it is pulled with unrelated histories
//! allowed; otherwise the initial commit is pushed.
//!
//! # Every run
//!
//! ```text
//! resolve version -> pop stash -> check conflicts -> commit pending
//!   -> checkout working branch -> pull stable -> pull remote working branch
//!   -> push working branch
//! ```
//!
//! Conflicts after any pull stop the run. A missing remote counterpart of
//! the stable or working branch is skipped, never an error.

use std::path::Path;

use super::context::CommitResult;
use super::error::ReleaseError;
use crate::core::manifest::Manifest;
use crate::core::types::BranchVersion;
use crate::core::version::{bumped, decide, latest_release, BumpKind, Decision, PolicyError};
use crate::git::Git;
use crate::ui::output::Reporter;
use crate::ui::prompts::{input_until, Prompter, RetryPolicy};

/// Branch and remote names used by the sequencer.
#[derive(Debug, Clone, Copy)]
pub struct Branches<'a> {
    pub remote: &'a str,
    pub stable: &'a str,
}

fn ask_commit_message(prompter: &dyn Prompter) -> Result<String, ReleaseError> {
    let message = input_until(
        prompter,
        "Commit message",
        |s| !s.trim().is_empty(),
        RetryPolicy::Unbounded,
    )?;
    Ok(message.trim().to_string())
}

/// Stage and commit everything pending, asking for a message.
///
/// Returns whether a commit was made.
fn commit_pending(git: &Git, prompter: &dyn Prompter) -> Result<bool, ReleaseError> {
    let status = git.worktree_status()?;
    status.ensure_no_conflicts()?;
    if !status.has_pending() {
        return Ok(false);
    }
    let message = ask_commit_message(prompter)?;
    git.add_all()?;
    git.commit(&message)?;
    Ok(true)
}

/// Open the project repository, initializing it on first run.
pub fn open_or_init(
    dir: &Path,
    clone_url: &str,
    branches: Branches<'_>,
    prompter: &dyn Prompter,
    reporter: &dyn Reporter,
) -> Result<Git, ReleaseError> {
    if Git::has_metadata(dir) {
        let git = Git::open(dir)?;
        if git.remote_url(branches.remote)?.is_none() {
            tracing::info!(remote = branches.remote, "adding missing remote");
            git.add_remote(branches.remote, clone_url)?;
        }
        return Ok(git);
    }

    tracing::info!(dir = %dir.display(), branch = branches.stable, "initializing repository");
    reporter.stage("Initializing git repository");
    let git = Git::init(dir, branches.stable)?;
    git.add_remote(branches.remote, clone_url)?;
    reconcile_initial_commit(&git, branches, prompter)?;
    reporter.success("Initializing git repository", clone_url);
    Ok(git)
}

/// Give a freshly initialized repository its first commit and sync it with
/// the remote stable branch.
fn reconcile_initial_commit(
    git: &Git,
    branches: Branches<'_>,
    prompter: &dyn Prompter,
) -> Result<(), ReleaseError> {
    tracing::info!("reconciling initial commit");
    commit_pending(git, prompter)?;

    if git.remote_branch_exists(branches.remote, branches.stable)? {
        tracing::info!(branch = branches.stable, "pulling existing remote stable branch");
        git.pull(branches.remote, branches.stable, true)?;
        git.worktree_status()?.ensure_no_conflicts()?;
    } else {
        tracing::info!(branch = branches.stable, "pushing initial commit");
        git.push(branches.remote, branches.stable)?;
    }
    Ok(())
}

/// Pick the working branch and version, bumping past an existing release.
///
/// A bump rewrites the manifest version.
pub fn resolve_release(
    git: &Git,
    remote: &str,
    manifest: &mut Manifest,
    prompter: &dyn Prompter,
) -> Result<CommitResult, ReleaseError> {
    tracing::info!("resolving branch and version");
    let project = manifest.project()?;
    let refs = git.ls_remote_refs(remote)?;
    let latest = latest_release(refs.iter().map(String::as_str));

    match decide(&project.version, latest.as_ref()) {
        Decision::UseLocal(release) => Ok(CommitResult {
            release,
            bump: None,
        }),
        Decision::NeedsBump { release } => {
            let options = BumpKind::all()
                .iter()
                .map(|k| -> Result<String, PolicyError> {
                    Ok(format!("{} ({} -> {})", k, release, k.apply(&release)?))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let index = prompter.select(
                &format!("Version {} is already released; choose the next version", release),
                &options,
                Some(0),
            )?;
            let kind = BumpKind::all().get(index).copied().ok_or_else(|| {
                ReleaseError::Cancelled(format!("no bump kind at index {}", index))
            })?;
            let next = bumped(&release, kind)?;
            tracing::info!(from = %release, to = %next.version(), kind = %kind, "bumping version");
            manifest.write_version(next.version())?;
            Ok(CommitResult {
                release: next,
                bump: Some(kind),
            })
        }
    }
}

fn switch_to(git: &Git, release: &BranchVersion) -> Result<(), ReleaseError> {
    let branch = release.branch();
    if git.current_branch()?.as_deref() == Some(branch) {
        return Ok(());
    }
    if git.local_branch_exists(branch) {
        tracing::info!(branch, "checking out working branch");
        git.checkout(branch)?;
    } else {
        tracing::info!(branch, "creating working branch");
        git.checkout_new(branch)?;
    }
    Ok(())
}

fn pull_if_present(git: &Git, remote: &str, branch: &str) -> Result<bool, ReleaseError> {
    if !git.remote_branch_exists(remote, branch)? {
        tracing::debug!(remote, branch, "no remote counterpart, skipping pull");
        return Ok(false);
    }
    tracing::info!(remote, branch, "pulling");
    git.pull(remote, branch, false)?;
    git.worktree_status()?.ensure_no_conflicts()?;
    Ok(true)
}

/// Bring the working branch to a pushed, conflict-free state.
pub fn commit_phase(
    git: &Git,
    manifest: &mut Manifest,
    branches: Branches<'_>,
    prompter: &dyn Prompter,
    reporter: &dyn Reporter,
) -> Result<CommitResult, ReleaseError> {
    let result = resolve_release(git, branches.remote, manifest, prompter)?;
    let branch = result.release.branch();
    reporter.stage(&format!("Preparing {}", branch));

    if !git.stash_list()?.is_empty() {
        tracing::info!("restoring stash");
        git.stash_pop()?;
    }

    tracing::info!("checking for conflicts");
    git.worktree_status()?.ensure_no_conflicts()?;

    if commit_pending(git, prompter)? {
        tracing::info!("committed pending changes");
    }

    switch_to(git, &result.release)?;

    pull_if_present(git, branches.remote, branches.stable)?;
    pull_if_present(git, branches.remote, branch)?;

    tracing::info!(remote = branches.remote, branch, "pushing working branch");
    git.push(branches.remote, branch)?;
    reporter.success(&format!("Preparing {}", branch), "pushed");
    Ok(result)
}
