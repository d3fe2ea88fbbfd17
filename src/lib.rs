//! shipyard - version, push, cloud-build and promote a project release
//!
//! shipyard turns locally modified source into a versioned, conflict-free
//! commit on a `dev/<version>` working branch, pushes it to a repository on
//! a hosting platform, hands it to a remote build service and, for
//! production releases, promotes it onto the stable branch.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to the engine)
//! - [`release`] - Publish engine: prepare, commit phase, build, promotion
//! - [`build`] - Build service session client and artifact index
//! - [`core`] - Domain types, version policy, manifest and settings
//! - [`git`] - Single interface for all Git operations
//! - [`forge`] - Abstraction for hosting platforms (GitHub, Gitee)
//! - [`store`] - Cached per-user release records
//! - [`ui`] - Prompts and progress output
//!
//! # Correctness Invariants
//!
//! 1. A release version never moves backwards past an existing release tag
//! 2. Conflicts halt a run before anything is committed or pushed
//! 3. A remote repository is created at most once per run
//! 4. A build session ends in exactly one terminal outcome

pub mod build;
pub mod cli;
pub mod core;
pub mod forge;
pub mod git;
pub mod release;
pub mod store;
pub mod ui;
