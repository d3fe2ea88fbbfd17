//! publish command - Commit, push, build and promote a release

use std::sync::Arc;

use crate::cli::Context;
use crate::core::config::Settings;
use crate::core::paths::ShipyardPaths;
use crate::release::{PublishOptions, Publisher};
use crate::store::default_store;
use crate::ui::output::{self, ConsoleReporter};
use crate::ui::prompts::TerminalPrompter;
use anyhow::{bail, Context as _, Result};

/// Flags of `shipyard publish`.
#[derive(Debug, Clone, Default)]
pub struct PublishArgs {
    pub refresh_server: bool,
    pub refresh_token: bool,
    pub refresh_owner: bool,
    pub build_cmd: Option<String>,
    pub prod: bool,
    pub skip_build: bool,
}

/// Run the publish command.
///
/// This is a synchronous wrapper that uses tokio to run the async implementation.
pub fn publish(ctx: &Context, args: PublishArgs) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(publish_async(ctx, args))
}

async fn publish_async(ctx: &Context, args: PublishArgs) -> Result<()> {
    let dir = ctx.project_dir()?;
    let loaded = Settings::load().context("Failed to load settings")?;
    if let Some(path) = &loaded.path {
        tracing::debug!(path = %path.display(), "loaded settings");
    }
    let paths = ShipyardPaths::from_env().context("Failed to locate the cache directory")?;

    let publisher = Publisher::new(
        Arc::new(default_store(&paths)),
        Arc::new(TerminalPrompter::new(ctx.interactive)),
        loaded.settings,
        paths,
    )
    .with_reporter(Arc::new(ConsoleReporter::new(ctx.verbosity())));

    let options = PublishOptions {
        dir,
        refresh_server: args.refresh_server,
        refresh_token: args.refresh_token,
        refresh_owner: args.refresh_owner,
        build_cmd: args.build_cmd,
        prod: args.prod,
        skip_build: args.skip_build,
    };

    let report = publisher.publish(options).await.map_err(|e| {
        let category = e.category();
        anyhow::Error::new(e).context(format!("Publish failed ({} error)", category))
    })?;

    let branch = report.commit.release.branch();
    match &report.build {
        None => output::print(
            format!("Pushed {} to {}", branch, report.target.repo.full_name()),
            ctx.verbosity(),
        ),
        Some(build) if build.success => {
            output::print(format!("Build of {} succeeded", branch), ctx.verbosity());
            if !report.promoted.is_empty() {
                output::print(
                    format!("Released {}", report.commit.release.tag()),
                    ctx.verbosity(),
                );
            }
        }
        Some(build) => bail!(
            "Build of {} failed: {}",
            branch,
            if build.failures.is_empty() {
                "the build service disconnected before the session started".to_string()
            } else {
                build.failures.join(", ")
            }
        ),
    }
    Ok(())
}
