//! forge::factory
//!
//! Forge selection and creation.
//!
//! # Design
//!
//! The release engine never names a concrete platform. The chosen
//! [`ForgeProvider`] is a stored record; [`create_forge`] turns it and the
//! token into a `dyn Forge`.
//!
//! # Example
//!
//! ```no_run
//! use shipyard::core::config::Settings;
//! use shipyard::forge::{create_forge, ForgeProvider};
//!
//! let forge = create_forge(ForgeProvider::Gitee, "token", &Settings::default()).unwrap();
//! assert_eq!(forge.name(), "gitee");
//! ```

use std::sync::Arc;

use super::gitee::{self, GiteeForge};
use super::github::{self, GitHubForge};
use super::traits::{Forge, ForgeError};
use crate::core::config::Settings;

/// Supported hosting platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForgeProvider {
    GitHub,
    Gitee,
}

impl ForgeProvider {
    /// All providers, in prompt order.
    ///
    /// # Example
    ///
    /// ```
    /// use shipyard::forge::ForgeProvider;
    ///
    /// assert_eq!(ForgeProvider::all().len(), 2);
    /// ```
    pub fn all() -> &'static [ForgeProvider] {
        &[ForgeProvider::GitHub, ForgeProvider::Gitee]
    }

    /// Name used in the config cache.
    pub fn name(&self) -> &'static str {
        match self {
            ForgeProvider::GitHub => "github",
            ForgeProvider::Gitee => "gitee",
        }
    }

    /// Label shown in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            ForgeProvider::GitHub => "GitHub",
            ForgeProvider::Gitee => "Gitee",
        }
    }

    /// Page where access tokens are issued.
    ///
    /// Available before any token exists, unlike [`Forge::token_issuance_url`].
    pub fn token_issuance_url(&self) -> &'static str {
        match self {
            ForgeProvider::GitHub => github::TOKEN_URL,
            ForgeProvider::Gitee => gitee::TOKEN_URL,
        }
    }

    /// Parse a provider from a string.
    ///
    /// # Example
    ///
    /// ```
    /// use shipyard::forge::ForgeProvider;
    ///
    /// assert_eq!(ForgeProvider::parse("GitHub"), Some(ForgeProvider::GitHub));
    /// assert_eq!(ForgeProvider::parse("gitlab"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "github" => Some(ForgeProvider::GitHub),
            "gitee" => Some(ForgeProvider::Gitee),
            _ => None,
        }
    }
}

impl std::fmt::Display for ForgeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Get valid provider names.
pub fn valid_forge_names() -> Vec<&'static str> {
    ForgeProvider::all().iter().map(|p| p.name()).collect()
}

/// Create a forge for `provider`, using API bases from `settings`.
pub fn create_forge(
    provider: ForgeProvider,
    token: &str,
    settings: &Settings,
) -> Result<Arc<dyn Forge>, ForgeError> {
    Ok(match provider {
        ForgeProvider::GitHub => Arc::new(GitHubForge::with_api_base(
            token,
            settings.github_api_base(),
        )?),
        ForgeProvider::Gitee => Arc::new(GiteeForge::with_api_base(
            token,
            settings.gitee_api_base(),
        )?),
    })
}
