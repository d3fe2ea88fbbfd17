//! release
//!
//! The release engine: from a modified project directory to a pushed
//! working branch, a remote build and, for production runs, a promoted
//! release.
//!
//! # Stages
//!
//! ```text
//! check manifest -> check cache dir -> host platform -> token
//!   -> account + orgs -> owner -> remote repo -> ignore file
//!   -> local repo (init on first run) -> commit phase
//!   -> build session -> promotion (production and success only)
//! ```
//!
//! Stages run strictly in order and the first failure ends the run. Every
//! stage receives the values produced before it; see [`context`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use shipyard::core::config::Settings;
//! use shipyard::core::paths::ShipyardPaths;
//! use shipyard::release::{PublishOptions, Publisher};
//! use shipyard::store::default_store;
//! use shipyard::ui::prompts::TerminalPrompter;
//!
//! # tokio_test::block_on(async {
//! let paths = ShipyardPaths::from_env().unwrap();
//! let publisher = Publisher::new(
//!     Arc::new(default_store(&paths)),
//!     Arc::new(TerminalPrompter::new(true)),
//!     Settings::default(),
//!     paths,
//! );
//! let report = publisher
//!     .publish(PublishOptions { dir: ".".into(), ..Default::default() })
//!     .await
//!     .unwrap();
//! println!("pushed {}", report.commit.release.branch());
//! # });
//! ```

pub mod context;
pub mod error;
pub mod local;
pub mod prepare;
pub mod promote;

use std::sync::Arc;

pub use context::{CommitResult, Owner, PublishOptions, PublishReport, RemoteTarget};
pub use error::ReleaseError;
pub use promote::{Promotion, PromotionStep};

use crate::build::{
    ArtifactIndex, BuildOutcome, BuildParams, BuildSession, HttpArtifactIndex, SessionTimeouts,
};
use crate::core::config::Settings;
use crate::core::manifest::{Manifest, ProjectInfo};
use crate::core::paths::ShipyardPaths;
use crate::core::types::PublishTarget;
use crate::forge::{create_forge, Forge, ForgeError, ForgeProvider};
use crate::git::Git;
use crate::store::ConfigStore;
use crate::ui::output::{ConsoleReporter, Reporter, Verbosity};
use crate::ui::prompts::Prompter;
use local::Branches;

/// Builds a forge for a provider and token.
pub type ForgeFactory =
    Arc<dyn Fn(ForgeProvider, &str) -> Result<Arc<dyn Forge>, ForgeError> + Send + Sync>;

/// Runs publish invocations.
pub struct Publisher {
    store: Arc<dyn ConfigStore>,
    prompter: Arc<dyn Prompter>,
    reporter: Arc<dyn Reporter>,
    settings: Settings,
    paths: ShipyardPaths,
    forges: ForgeFactory,
    artifacts: Option<Arc<dyn ArtifactIndex>>,
}

impl Publisher {
    /// Create a publisher using the real forges, artifact index and a
    /// console reporter.
    pub fn new(
        store: Arc<dyn ConfigStore>,
        prompter: Arc<dyn Prompter>,
        settings: Settings,
        paths: ShipyardPaths,
    ) -> Self {
        let forge_settings = settings.clone();
        Self {
            store,
            prompter,
            reporter: Arc::new(ConsoleReporter::new(Verbosity::Normal)),
            settings,
            paths,
            forges: Arc::new(move |provider, token| create_forge(provider, token, &forge_settings)),
            artifacts: None,
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_forge_factory(mut self, forges: ForgeFactory) -> Self {
        self.forges = forges;
        self
    }

    pub fn with_artifact_index(mut self, artifacts: Arc<dyn ArtifactIndex>) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    fn branches(&self) -> Branches<'_> {
        Branches {
            remote: self.settings.remote_name(),
            stable: self.settings.stable_branch(),
        }
    }

    /// Check the manifest and build command before anything else runs.
    fn check_configuration(
        &self,
        options: &PublishOptions,
    ) -> Result<(Manifest, ProjectInfo, String), ReleaseError> {
        tracing::info!(dir = %options.dir.display(), "checking project configuration");
        let manifest = Manifest::load(&options.dir)?;
        let project = manifest.project()?;
        let build_cmd = options
            .build_cmd
            .clone()
            .unwrap_or_else(|| self.settings.build_command().to_string());
        manifest.check_build_command(&build_cmd)?;
        Ok((manifest, project, build_cmd))
    }

    /// Resolve cached records and make sure the remote repository exists.
    async fn prepare(
        &self,
        options: &PublishOptions,
        project: &ProjectInfo,
    ) -> Result<RemoteTarget, ReleaseError> {
        let store = self.store.as_ref();
        let prompter = self.prompter.as_ref();

        prepare::check_home_dir(&self.paths)?;
        let (provider, changed) =
            prepare::resolve_provider(store, prompter, options.refresh_server)?;
        let credentials = prepare::resolve_token(
            store,
            prompter,
            self.reporter.as_ref(),
            provider,
            options.refresh_token || changed,
        )?;
        let forge = (self.forges)(credentials.provider, &credentials.token)?;

        let identity = prepare::fetch_identity(forge.as_ref()).await?;
        let owner = prepare::resolve_owner(
            store,
            prompter,
            &identity,
            options.refresh_owner || changed,
        )?;
        let (repo, created) =
            prepare::ensure_remote_repo(forge.as_ref(), &owner, &project.name).await?;
        if created {
            self.reporter.success("Created remote repository", &repo.full_name());
        }
        let clone_url = forge.clone_url(&repo.login, &repo.name);
        if !Git::has_metadata(&options.dir) {
            self.reporter.stage(&format!(
                "Make sure your SSH key is registered: {}",
                forge.credential_setup_url()
            ));
        }
        prepare::ensure_ignore_file(store, &options.dir)?;

        Ok(RemoteTarget {
            provider,
            owner,
            repo,
            created,
            clone_url,
        })
    }

    /// Run one publish.
    pub async fn publish(&self, options: PublishOptions) -> Result<PublishReport, ReleaseError> {
        let (mut manifest, project, build_cmd) = self.check_configuration(&options)?;
        let target = self.prepare(&options, &project).await?;

        let commit = {
            let git = local::open_or_init(
                &options.dir,
                &target.clone_url,
                self.branches(),
                self.prompter.as_ref(),
                self.reporter.as_ref(),
            )?;
            local::commit_phase(
                &git,
                &mut manifest,
                self.branches(),
                self.prompter.as_ref(),
                self.reporter.as_ref(),
            )?
        };

        if options.skip_build {
            tracing::info!("build skipped");
            return Ok(PublishReport {
                target,
                commit,
                build: None,
                promoted: Vec::new(),
            });
        }

        let publish_target =
            prepare::resolve_publish_target(self.store.as_ref(), self.prompter.as_ref())?;
        if options.prod {
            self.confirm_overwrite(&project.name).await?;
        }

        let outcome = self
            .build(&target, &commit, &project, build_cmd, options.prod, publish_target)
            .await?;

        let promoted = if outcome.success && options.prod {
            let git = Git::open(&options.dir)?;
            let branches = self.branches();
            Promotion::new(&git, branches.remote, branches.stable, &commit.release)
                .run(self.reporter.as_ref())?
        } else {
            if !outcome.success {
                tracing::warn!(failures = ?outcome.failures, "build failed, not promoting");
            }
            Vec::new()
        };

        Ok(PublishReport {
            target,
            commit,
            build: Some(outcome),
            promoted,
        })
    }

    /// Ask before replacing an artifact that is already published.
    async fn confirm_overwrite(&self, name: &str) -> Result<(), ReleaseError> {
        let artifacts: Arc<dyn ArtifactIndex> = match &self.artifacts {
            Some(index) => Arc::clone(index),
            None => Arc::new(HttpArtifactIndex::new(self.settings.artifact_index_url())?),
        };
        if !artifacts.has_published(name).await? {
            return Ok(());
        }
        let overwrite = self.prompter.confirm(
            &format!("A production build of '{}' is already published. Overwrite it?", name),
            false,
        )?;
        if overwrite {
            Ok(())
        } else {
            Err(ReleaseError::Cancelled(format!(
                "kept the published build of '{}'",
                name
            )))
        }
    }

    async fn build(
        &self,
        target: &RemoteTarget,
        commit: &CommitResult,
        project: &ProjectInfo,
        build_cmd: String,
        prod: bool,
        publish_target: PublishTarget,
    ) -> Result<BuildOutcome, ReleaseError> {
        tracing::info!(branch = commit.release.branch(), prod, "starting build session");
        let params = BuildParams {
            repo: target.clone_url.clone(),
            name: project.name.clone(),
            branch: commit.release.branch().to_string(),
            version: commit.release.version().clone(),
            build_cmd,
            prod,
            target: publish_target,
        };
        let session = BuildSession::new(
            self.settings.build_service_url(),
            &params,
            SessionTimeouts::from_settings(&self.settings),
        )?;
        Ok(session.run(self.reporter.as_ref()).await?)
    }
}
