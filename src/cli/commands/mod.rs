//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Async Commands
//!
//! `publish` talks to the hosting platform and the build service, so it is
//! async. Dispatch runs it on a tokio runtime created for the invocation.

mod completion;
mod config_cmd;
mod publish;

pub use completion::completion;
pub use config_cmd::{list, reset};
pub use publish::publish;

use super::args::{Command, ConfigAction};
use super::Context;
use anyhow::Result;

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Publish {
            refresh_server,
            refresh_token,
            refresh_owner,
            build_cmd,
            prod,
            skip_build,
        } => publish(
            ctx,
            publish::PublishArgs {
                refresh_server,
                refresh_token,
                refresh_owner,
                build_cmd,
                prod,
                skip_build,
            },
        ),
        Command::Config { action } => match action {
            ConfigAction::List => list(ctx),
            ConfigAction::Reset { key } => reset(ctx, &key),
        },
        Command::Completion { shell } => completion(shell),
    }
}
