//! git::interface
//!
//! Git interface implementation.
//!
//! This module provides the **single doorway** to all Git operations in
//! shipyard. Repository reads (discovery, status, branches, tags, remotes)
//! go through `git2`; operations that touch the network or need the user's
//! configured merge and credential machinery (pull, push, ls-remote, merge,
//! commit) shell out to the `git` binary.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::Conflicts`]: Unresolved conflicts in the working tree
//! - [`GitError::CommandFailed`]: A `git` subprocess exited non-zero
//!
//! # Example
//!
//! ```ignore
//! use shipyard::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let status = git.worktree_status()?;
//! if status.has_conflicts() {
//!     eprintln!("conflicts in: {:?}", status.conflicted);
//! }
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// The working tree has unresolved conflicts.
    #[error("unresolved conflicts in {} file(s): {}", paths.len(), paths.join(", "))]
    Conflicts {
        /// Conflicted paths relative to the work dir
        paths: Vec<String>,
    },

    /// A git subprocess failed.
    #[error("`git {command}` failed: {stderr}")]
    CommandFailed {
        /// Arguments passed to git
        command: String,
        /// Trimmed standard error
        stderr: String,
    },

    /// The git binary could not be run.
    #[error("failed to run git: {message}")]
    Spawn {
        /// The error message
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

/// Summary of working tree status.
///
/// Conflict detection is a pure predicate over this value, so callers can
/// test it without a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// Paths with unresolved conflicts
    pub conflicted: Vec<String>,
    /// Number of staged changes
    pub staged: usize,
    /// Number of unstaged changes to tracked files
    pub unstaged: usize,
    /// Number of untracked files
    pub untracked: usize,
}

impl WorktreeStatus {
    /// Whether any path is conflicted.
    ///
    /// # Example
    ///
    /// ```
    /// use shipyard::git::WorktreeStatus;
    ///
    /// let mut status = WorktreeStatus::default();
    /// assert!(!status.has_conflicts());
    /// status.conflicted.push("src/lib.rs".into());
    /// assert!(status.has_conflicts());
    /// ```
    pub fn has_conflicts(&self) -> bool {
        !self.conflicted.is_empty()
    }

    /// Whether there is anything to commit.
    pub fn has_pending(&self) -> bool {
        self.staged > 0 || self.unstaged > 0 || self.untracked > 0
    }

    /// Fail with [`GitError::Conflicts`] if any path is conflicted.
    pub fn ensure_no_conflicts(&self) -> Result<(), GitError> {
        if self.has_conflicts() {
            return Err(GitError::Conflicts {
                paths: self.conflicted.clone(),
            });
        }
        Ok(())
    }
}

/// The Git interface.
///
/// This is the **single point of interaction** with Git. No other module
/// should import `git2` or spawn `git` directly.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
    /// Working directory
    work_dir: PathBuf,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening and Info
    // =========================================================================

    /// Whether `dir` itself carries git metadata (a `.git` entry).
    ///
    /// Unlike [`Git::open`], parent directories are not searched.
    pub fn has_metadata(dir: &Path) -> bool {
        dir.join(".git").exists()
    }

    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover` to find the repository root,
    /// so `path` can be any directory within the repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        Self::from_repo(repo)
    }

    /// Initialize a repository in `path` whose unborn HEAD points at
    /// `initial_branch`.
    pub fn init(path: &Path, initial_branch: &str) -> Result<Self, GitError> {
        let mut opts = git2::RepositoryInitOptions::new();
        opts.initial_head(initial_branch);
        let repo = git2::Repository::init_opts(path, &opts)?;
        tracing::debug!(path = %path.display(), branch = initial_branch, "initialized repository");
        Self::from_repo(repo)
    }

    fn from_repo(repo: git2::Repository) -> Result<Self, GitError> {
        let work_dir = repo.workdir().ok_or(GitError::BareRepo)?.to_path_buf();
        Ok(Self { repo, work_dir })
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Get a summary of the working tree status, including untracked files.
    pub fn worktree_status(&self) -> Result<WorktreeStatus, GitError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        let mut result = WorktreeStatus::default();

        for entry in statuses.iter() {
            let status = entry.status();

            if status.is_conflicted() {
                result
                    .conflicted
                    .push(entry.path().unwrap_or_default().to_string());
                continue;
            }

            if status.is_index_new()
                || status.is_index_modified()
                || status.is_index_deleted()
                || status.is_index_renamed()
                || status.is_index_typechange()
            {
                result.staged += 1;
            }

            if status.is_wt_modified()
                || status.is_wt_deleted()
                || status.is_wt_renamed()
                || status.is_wt_typechange()
            {
                result.unstaged += 1;
            }

            if status.is_wt_new() {
                result.untracked += 1;
            }
        }

        Ok(result)
    }

    // =========================================================================
    // Branches, tags and remotes (git2)
    // =========================================================================

    /// Name of the checked-out branch, `None` when detached.
    ///
    /// Works on an unborn branch.
    pub fn current_branch(&self) -> Result<Option<String>, GitError> {
        match self.repo.head() {
            Ok(head) if head.is_branch() => Ok(head.shorthand().map(String::from)),
            Ok(_) => Ok(None),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => {
                let head = self.repo.find_reference("HEAD")?;
                Ok(head
                    .symbolic_target()
                    .and_then(|t| t.strip_prefix("refs/heads/"))
                    .map(String::from))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a local branch exists.
    pub fn local_branch_exists(&self, name: &str) -> bool {
        self.repo.find_branch(name, git2::BranchType::Local).is_ok()
    }

    /// List local branch names.
    pub fn local_branches(&self) -> Result<Vec<String>, GitError> {
        let mut names = Vec::new();
        for branch in self.repo.branches(Some(git2::BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(name) = branch.name()? {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// List local tag names.
    pub fn local_tags(&self) -> Result<Vec<String>, GitError> {
        let tags = self.repo.tag_names(None)?;
        Ok(tags.iter().flatten().map(String::from).collect())
    }

    /// Whether a local tag exists.
    pub fn local_tag_exists(&self, name: &str) -> bool {
        self.repo
            .find_reference(&format!("refs/tags/{}", name))
            .is_ok()
    }

    /// Get the URL for a remote.
    ///
    /// Returns `None` if the remote doesn't exist.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>, GitError> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(String::from)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Add a remote, or repoint it if it already exists.
    pub fn add_remote(&self, name: &str, url: &str) -> Result<(), GitError> {
        if self.remote_url(name)?.is_some() {
            self.repo.remote_set_url(name, url)?;
        } else {
            self.repo.remote(name, url)?;
        }
        tracing::debug!(remote = name, url, "configured remote");
        Ok(())
    }

    // =========================================================================
    // Subprocess operations
    // =========================================================================

    /// Run `git <args>` in the work dir, returning trimmed stdout.
    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let command = args.join(" ");
        tracing::debug!(command = %command, "git");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.work_dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_MERGE_AUTOEDIT", "no")
            .output()
            .map_err(|e| GitError::Spawn {
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let stderr = if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr
            };
            return Err(GitError::CommandFailed { command, stderr });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run a command that may leave conflicts behind.
    ///
    /// A failure with conflicts in the working tree becomes
    /// [`GitError::Conflicts`]; any other failure is returned as is.
    fn run_merging(&self, args: &[&str]) -> Result<(), GitError> {
        match self.run(args) {
            Ok(_) => Ok(()),
            Err(err) => {
                self.worktree_status()?.ensure_no_conflicts()?;
                Err(err)
            }
        }
    }

    /// Stage every change, including untracked and deleted files.
    pub fn add_all(&self) -> Result<(), GitError> {
        self.run(&["add", "-A"]).map(drop)
    }

    /// Commit the index.
    pub fn commit(&self, message: &str) -> Result<(), GitError> {
        self.run(&["commit", "-m", message]).map(drop)
    }

    /// Check out an existing branch.
    pub fn checkout(&self, branch: &str) -> Result<(), GitError> {
        self.run(&["checkout", branch]).map(drop)
    }

    /// Create a branch at HEAD and check it out.
    pub fn checkout_new(&self, branch: &str) -> Result<(), GitError> {
        self.run(&["checkout", "-b", branch]).map(drop)
    }

    /// List stash entries, newest first.
    pub fn stash_list(&self) -> Result<Vec<String>, GitError> {
        let out = self.run(&["stash", "list"])?;
        Ok(out.lines().map(String::from).collect())
    }

    /// Pop the newest stash entry.
    pub fn stash_pop(&self) -> Result<(), GitError> {
        self.run_merging(&["stash", "pop"])
    }

    /// Pull `branch` from `remote` with a merge.
    pub fn pull(
        &self,
        remote: &str,
        branch: &str,
        allow_unrelated_histories: bool,
    ) -> Result<(), GitError> {
        let mut args = vec!["pull", "--no-rebase", "--no-edit", remote, branch];
        if allow_unrelated_histories {
            args.push("--allow-unrelated-histories");
        }
        self.run_merging(&args)
    }

    /// Push `branch` to `remote`, setting upstream.
    pub fn push(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        self.run(&["push", "--set-upstream", remote, branch])
            .map(drop)
    }

    /// List remote ref names (`refs/heads/...`, `refs/tags/...`).
    pub fn ls_remote_refs(&self, remote: &str) -> Result<Vec<String>, GitError> {
        let out = self.run(&["ls-remote", "--refs", remote])?;
        Ok(parse_ls_remote(&out))
    }

    /// Whether `remote` has a branch named `branch`.
    pub fn remote_branch_exists(&self, remote: &str, branch: &str) -> Result<bool, GitError> {
        let wanted = format!("refs/heads/{}", branch);
        Ok(self.ls_remote_refs(remote)?.iter().any(|r| *r == wanted))
    }

    /// Create a lightweight tag at HEAD.
    pub fn tag(&self, name: &str) -> Result<(), GitError> {
        self.run(&["tag", name]).map(drop)
    }

    /// Delete a local tag. Deleting a missing tag is not an error.
    pub fn delete_local_tag(&self, name: &str) -> Result<(), GitError> {
        if !self.local_tag_exists(name) {
            return Ok(());
        }
        self.run(&["tag", "-d", name]).map(drop)
    }

    /// Push every local tag.
    pub fn push_tags(&self, remote: &str) -> Result<(), GitError> {
        self.run(&["push", remote, "--tags"]).map(drop)
    }

    /// Delete a ref on the remote (`git push <remote> :<refname>`).
    pub fn delete_remote_ref(&self, remote: &str, refname: &str) -> Result<(), GitError> {
        self.run(&["push", remote, &format!(":{}", refname)])
            .map(drop)
    }

    /// Merge `from` into the checked-out branch.
    pub fn merge(&self, from: &str) -> Result<(), GitError> {
        self.run_merging(&["merge", "--no-edit", from])
    }

    /// Delete a fully merged local branch.
    pub fn delete_local_branch(&self, name: &str) -> Result<(), GitError> {
        self.run(&["branch", "-d", name]).map(drop)
    }
}

/// Extract ref names from `git ls-remote` output.
///
/// # Example
///
/// ```
/// use shipyard::git::parse_ls_remote;
///
/// let out = "abc123\trefs/heads/master\ndef456\trefs/tags/release/1.0.0\n";
/// assert_eq!(
///     parse_ls_remote(out),
///     vec!["refs/heads/master", "refs/tags/release/1.0.0"]
/// );
/// ```
pub fn parse_ls_remote(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(String::from)
        .collect()
}
