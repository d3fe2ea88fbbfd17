//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--no-interactive`: Fail instead of prompting
//! - `--quiet` / `-q`: Minimal output; implies `--no-interactive`

use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

/// shipyard - version, push, cloud-build and promote a project release
#[derive(Parser, Debug)]
#[command(name = "shipyard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if shipyard was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable interactive prompts; missing cached records become errors
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Returns false if `--no-interactive` or `--quiet` was set, or if
    /// stdin is not a terminal.
    pub fn interactive(&self) -> bool {
        !(self.no_interactive || self.quiet) && std::io::stdin().is_terminal()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Commit, push and build a release
    #[command(
        name = "publish",
        long_about = "Commit, push and build a release.\n\n\
            Publishing checks the project manifest, makes sure a remote repository \
            exists on the chosen hosting platform, commits pending changes onto the \
            working branch dev/<version>, pushes it and hands it to the build service. \
            If a release tag for the current version already exists you are asked \
            which version component to bump.\n\n\
            With --prod, a successful build is promoted: the release/<version> tag is \
            created, the working branch is merged into the stable branch and deleted.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Push and build a test release
    shipyard publish

    # Build and promote a production release
    shipyard publish --prod

    # Only commit and push the working branch
    shipyard publish --skip-build

    # Switch hosting platform or token
    shipyard publish --refresh-server --refresh-token"
    )]
    Publish {
        /// Ask for the hosting platform again
        #[arg(long)]
        refresh_server: bool,

        /// Ask for the access token again
        #[arg(long)]
        refresh_token: bool,

        /// Ask for the repository owner again
        #[arg(long)]
        refresh_owner: bool,

        /// Build command run by the build service, e.g. "npm run build"
        #[arg(long, value_name = "CMD")]
        build_cmd: Option<String>,

        /// Production release: promote on a successful build
        #[arg(long)]
        prod: bool,

        /// Stop after pushing the working branch
        #[arg(long, conflicts_with = "prod")]
        skip_build: bool,
    },

    /// Inspect or reset cached records
    #[command(
        name = "config",
        long_about = "Inspect or reset cached records.\n\n\
            shipyard caches the hosting platform, access token, repository owner, \
            ignore-file template and publish target under ~/.shipyard/git/. A \
            record is trusted until it is reset here or refreshed by a publish flag.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Show cached records (the token is masked)
    shipyard config list

    # Forget the access token
    shipyard config reset token"
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    eval \"$(shipyard completion bash)\"

    # Zsh
    shipyard completion zsh > ~/.zfunc/_shipyard

    # Fish
    shipyard completion fish > ~/.config/fish/completions/shipyard.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// List cached records
    List,
    /// Delete one cached record
    Reset {
        /// Record name (server, token, owner, login, gitignore, publish)
        key: String,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
