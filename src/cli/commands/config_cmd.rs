//! config command - List or reset cached records

use crate::cli::Context;
use crate::core::paths::ShipyardPaths;
use crate::store::{default_store, ConfigKey, ConfigStore};
use crate::ui::output::{self, redact};
use anyhow::{Context as _, Result};

fn open_store() -> Result<impl ConfigStore> {
    let paths = ShipyardPaths::from_env().context("Failed to locate the cache directory")?;
    Ok(default_store(&paths))
}

/// List every cached record. The token is masked.
pub fn list(ctx: &Context) -> Result<()> {
    let store = open_store()?;
    for key in ConfigKey::all() {
        let value = store
            .get(*key)
            .with_context(|| format!("Failed to read '{}'", key))?;
        let shown = match value {
            Some(v) if key.is_secret() => redact(&v),
            // The ignore template spans lines; show its first line only
            Some(v) if *key == ConfigKey::IgnoreTemplate => {
                format!("{} ...", v.lines().next().unwrap_or_default())
            }
            Some(v) => v,
            None => "(not set)".to_string(),
        };
        output::print(format!("{:<10} {}", key.name(), shown), ctx.verbosity());
    }
    Ok(())
}

/// Delete one cached record so the next publish asks for it again.
pub fn reset(ctx: &Context, key: &str) -> Result<()> {
    let key: ConfigKey = key.parse()?;
    let store = open_store()?;
    store
        .delete(key)
        .with_context(|| format!("Failed to reset '{}'", key))?;
    output::print(format!("Reset {}", key), ctx.verbosity());
    Ok(())
}
