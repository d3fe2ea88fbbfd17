//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. All repository reads and
//! writes flow through this interface. No other module should import `git2`
//! or spawn the `git` binary.
//!
//! # Responsibilities
//!
//! - Repository discovery, opening and initialization
//! - Status and conflict detection
//! - Branch, tag and remote queries
//! - Commit, checkout, stash, pull, push, merge and tag mutations
//!
//! # Invariants
//!
//! - A failed pull, merge or stash pop that leaves conflicts behind is
//!   always reported as [`GitError::Conflicts`]
//! - Every subprocess invocation is logged at debug level

mod interface;

pub use interface::{parse_ls_remote, Git, GitError, WorktreeStatus};
