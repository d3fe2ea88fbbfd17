//! cli
//!
//! Command-line interface layer for shipyard.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Build the collaborators (store, prompter, reporter, settings)
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and hands publish
//! runs to the [`crate::release`] engine. Errors are `anyhow` here and are
//! printed once by `main`.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::ui::output::Verbosity;

/// Global flags resolved for one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    pub debug: bool,
    pub quiet: bool,
    /// Whether prompts may be shown.
    pub interactive: bool,
}

impl Context {
    /// Project directory: `--cwd` or the process working directory.
    pub fn project_dir(&self) -> Result<PathBuf> {
        match &self.cwd {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("Failed to read the current directory"),
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run(cli: Cli) -> Result<()> {
    let ctx = Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        interactive: cli.interactive(),
    };

    commands::dispatch(cli.command, &ctx)
}
