//! release::prepare
//!
//! Stages that run before the local repository is touched: cached records,
//! the remote account and the remote repository.
//!
//! Every record is read through the store first and only asked for when
//! it is missing, unusable or explicitly refreshed. A record is trusted once
//! written.

use std::fs;
use std::path::Path;

use super::context::{Credentials, Identity, Owner};
use super::error::ReleaseError;
use crate::core::paths::ShipyardPaths;
use crate::core::types::{OwnerKind, PublishTarget, RepoRecord};
use crate::forge::{Forge, ForgeProvider};
use crate::store::{ConfigKey, ConfigStore};
use crate::ui::output::Reporter;
use crate::ui::prompts::{password_until, Prompter, RetryPolicy};

/// Name of the ignore file written into new projects.
pub const IGNORE_FILE: &str = ".gitignore";

/// Template used when the store has none.
pub const DEFAULT_IGNORE_TEMPLATE: &str = "\
.DS_Store
node_modules
/dist

# local env files
.env.local
.env.*.local

# Log files
npm-debug.log*
yarn-debug.log*
yarn-error.log*
pnpm-debug.log*

# Editor directories and files
.idea
.vscode
*.suo
*.ntvs*
*.njsproj
*.sln
*.sw?
";

/// Invalid token answers tolerated before giving up.
const TOKEN_ATTEMPTS: usize = 3;

fn cached(
    store: &dyn ConfigStore,
    key: ConfigKey,
    refresh: bool,
) -> Result<Option<String>, ReleaseError> {
    if refresh {
        return Ok(None);
    }
    Ok(store.get(key)?)
}

/// Make sure the per-user cache directory exists.
pub fn check_home_dir(paths: &ShipyardPaths) -> Result<(), ReleaseError> {
    tracing::info!(dir = %paths.cache_dir().display(), "checking cache directory");
    fs::create_dir_all(paths.store_dir()).map_err(|e| {
        ReleaseError::Configuration(format!(
            "cannot create cache directory '{}': {}",
            paths.store_dir().display(),
            e
        ))
    })
}

/// Resolve the hosting platform.
///
/// Returns the provider and whether it differs from the stored one.
pub fn resolve_provider(
    store: &dyn ConfigStore,
    prompter: &dyn Prompter,
    refresh: bool,
) -> Result<(ForgeProvider, bool), ReleaseError> {
    tracing::info!("resolving hosting platform");
    let stored = store
        .get(ConfigKey::HostPlatform)?
        .and_then(|s| ForgeProvider::parse(&s));

    if !refresh {
        if let Some(provider) = stored {
            return Ok((provider, false));
        }
    }

    let options: Vec<String> = ForgeProvider::all()
        .iter()
        .map(|p| p.label().to_string())
        .collect();
    let default = stored.and_then(|s| ForgeProvider::all().iter().position(|p| *p == s));
    let index = prompter.select("Select a hosting platform", &options, default)?;
    let provider = pick(ForgeProvider::all(), index)?;

    store.set(ConfigKey::HostPlatform, provider.name())?;
    Ok((provider, stored != Some(provider)))
}

/// Resolve the access token for `provider`.
pub fn resolve_token(
    store: &dyn ConfigStore,
    prompter: &dyn Prompter,
    reporter: &dyn Reporter,
    provider: ForgeProvider,
    refresh: bool,
) -> Result<Credentials, ReleaseError> {
    tracing::info!(platform = %provider, "resolving access token");
    if let Some(token) = cached(store, ConfigKey::Token, refresh)? {
        return Ok(Credentials { provider, token });
    }

    reporter.stage(&format!(
        "Create a {} access token at {}",
        provider.label(),
        provider.token_issuance_url()
    ));
    let token = password_until(
        prompter,
        &format!("{} access token", provider.label()),
        |s| !s.trim().is_empty(),
        RetryPolicy::Bounded(TOKEN_ATTEMPTS),
    )?;
    let token = token.trim().to_string();
    store.set(ConfigKey::Token, &token)?;
    Ok(Credentials { provider, token })
}

/// Fetch the authenticated account and its organizations.
pub async fn fetch_identity(forge: &dyn Forge) -> Result<Identity, ReleaseError> {
    tracing::info!(platform = forge.name(), "fetching account");
    let user = forge.get_user().await?;
    let orgs = forge.get_organizations(&user).await?;
    tracing::debug!(login = %user.login, orgs = orgs.len(), "fetched account");
    Ok(Identity { user, orgs })
}

/// Resolve who owns the remote repository.
///
/// With no organizations the account itself is the owner and nothing is
/// asked. A stored organization login that is no longer among the account's
/// organizations is asked for again.
pub fn resolve_owner(
    store: &dyn ConfigStore,
    prompter: &dyn Prompter,
    identity: &Identity,
    refresh: bool,
) -> Result<Owner, ReleaseError> {
    tracing::info!("resolving repository owner");

    let kind = if identity.orgs.is_empty() {
        OwnerKind::User
    } else {
        match cached(store, ConfigKey::OwnerKind, refresh)?
            .and_then(|s| OwnerKind::parse(&s).ok())
        {
            Some(kind) => kind,
            None => {
                let kinds = [OwnerKind::User, OwnerKind::Org];
                let options: Vec<String> = kinds.iter().map(|k| k.label().to_string()).collect();
                let index = prompter.select("Select the repository owner type", &options, Some(0))?;
                pick(&kinds, index)?
            }
        }
    };

    let login = match kind {
        OwnerKind::User => identity.user.login.clone(),
        OwnerKind::Org => {
            let stored = cached(store, ConfigKey::Login, refresh)?
                .filter(|l| identity.orgs.iter().any(|o| o.login == *l));
            match stored {
                Some(login) => login,
                None => {
                    let options: Vec<String> =
                        identity.orgs.iter().map(|o| o.login.clone()).collect();
                    let index = prompter.select("Select an organization", &options, Some(0))?;
                    pick(&options, index)?
                }
            }
        }
    };

    store.set(ConfigKey::OwnerKind, kind.as_str())?;
    store.set(ConfigKey::Login, &login)?;
    Ok(Owner { kind, login })
}

/// Look up the remote repository and create it if it is absent.
///
/// Creation is attempted at most once. Returns the record and whether it
/// was created.
pub async fn ensure_remote_repo(
    forge: &dyn Forge,
    owner: &Owner,
    name: &str,
) -> Result<(RepoRecord, bool), ReleaseError> {
    tracing::info!(owner = %owner.login, name, "checking remote repository");
    if forge.get_repository(&owner.login, name).await?.is_some() {
        return Ok((
            RepoRecord {
                login: owner.login.clone(),
                name: name.to_string(),
                exists: true,
            },
            false,
        ));
    }

    tracing::info!(owner = %owner.login, name, kind = owner.kind.as_str(), "creating remote repository");
    let created = match owner.kind {
        OwnerKind::User => forge.create_user_repository(name).await?,
        OwnerKind::Org => forge.create_organization_repository(name, &owner.login).await?,
    };
    Ok((
        RepoRecord {
            login: created.owner.login,
            name: created.name,
            exists: true,
        },
        true,
    ))
}

/// Write the ignore file into `dir` if it has none.
///
/// Returns whether the file was written.
pub fn ensure_ignore_file(store: &dyn ConfigStore, dir: &Path) -> Result<bool, ReleaseError> {
    let path = dir.join(IGNORE_FILE);
    if path.exists() {
        return Ok(false);
    }
    tracing::info!(path = %path.display(), "writing ignore file");

    let template = match store.get(ConfigKey::IgnoreTemplate)? {
        Some(t) => t,
        None => {
            store.set(ConfigKey::IgnoreTemplate, DEFAULT_IGNORE_TEMPLATE)?;
            DEFAULT_IGNORE_TEMPLATE.trim().to_string()
        }
    };
    let mut contents = template;
    contents.push('\n');
    fs::write(&path, contents).map_err(|e| {
        ReleaseError::Configuration(format!("cannot write '{}': {}", path.display(), e))
    })?;
    Ok(true)
}

/// Resolve where the build service publishes artifacts.
pub fn resolve_publish_target(
    store: &dyn ConfigStore,
    prompter: &dyn Prompter,
) -> Result<PublishTarget, ReleaseError> {
    if let Some(target) = store
        .get(ConfigKey::PublishTarget)?
        .and_then(|s| PublishTarget::parse(&s).ok())
    {
        return Ok(target);
    }

    let targets = PublishTarget::all();
    let target = match targets {
        [only] => *only,
        _ => {
            let options: Vec<String> = targets.iter().map(|t| t.label().to_string()).collect();
            let index = prompter.select("Select a publish target", &options, Some(0))?;
            pick(targets, index)?
        }
    };
    store.set(ConfigKey::PublishTarget, target.as_str())?;
    Ok(target)
}

fn pick<T: Clone>(items: &[T], index: usize) -> Result<T, ReleaseError> {
    items
        .get(index)
        .cloned()
        .ok_or_else(|| ReleaseError::Cancelled(format!("no option at index {}", index)))
}
