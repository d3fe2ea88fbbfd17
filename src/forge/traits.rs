//! forge::traits
//!
//! Forge trait definition for interacting with source hosting platforms.
//!
//! # Design
//!
//! The `Forge` trait is async because forge operations involve network I/O.
//! All methods return `Result` to handle API errors gracefully.
//!
//! Lookups distinguish "confirmed absent" from "lookup failed":
//! [`Forge::get_repository`] returns `Ok(None)` only for a 404 and surfaces
//! every other failure as a [`ForgeError`].
//!
//! # Example
//!
//! ```ignore
//! use shipyard::forge::{Forge, ForgeError};
//!
//! async fn ensure(forge: &dyn Forge, login: &str) -> Result<(), ForgeError> {
//!     if forge.get_repository(login, "widget").await?.is_none() {
//!         forge.create_user_repository("widget").await?;
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Errors from forge operations.
///
/// These error types map to common failure modes when interacting
/// with remote hosting platforms.
#[derive(Debug, Clone, Error)]
pub enum ForgeError {
    /// Authentication is required but not available.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// Unknown hosting platform name.
    #[error("unknown hosting platform '{0}' (valid: github, gitee)")]
    UnknownProvider(String),
}

/// The authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteUser {
    /// Account login
    pub login: String,
    /// Display name, if set
    #[serde(default)]
    pub name: Option<String>,
}

/// An organization the account belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Organization {
    /// Organization login
    pub login: String,
}

/// Owner block embedded in repository payloads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

/// A remote repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    /// Repository name
    pub name: String,
    /// `owner/name`
    pub full_name: String,
    /// Owning account
    pub owner: RepositoryOwner,
    /// SSH clone URL
    #[serde(default)]
    pub ssh_url: Option<String>,
    /// Web URL
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Capability interface implemented once per hosting platform.
///
/// Implementations carry the access token and attach it to every request
/// as a bearer credential.
#[async_trait]
pub trait Forge: Send + Sync {
    /// Platform name as stored in the config cache.
    fn name(&self) -> &'static str;

    /// Fetch the authenticated account.
    async fn get_user(&self) -> Result<RemoteUser, ForgeError>;

    /// Fetch the organizations of `user` (first page, up to 100).
    async fn get_organizations(&self, user: &RemoteUser) -> Result<Vec<Organization>, ForgeError>;

    /// Look up a repository.
    ///
    /// Returns `Ok(None)` when the platform answers 404.
    async fn get_repository(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Option<Repository>, ForgeError>;

    /// Create a repository under the authenticated account.
    async fn create_user_repository(&self, name: &str) -> Result<Repository, ForgeError>;

    /// Create a repository under an organization.
    async fn create_organization_repository(
        &self,
        name: &str,
        org: &str,
    ) -> Result<Repository, ForgeError>;

    /// SSH clone URL for `owner/name`.
    fn clone_url(&self, owner: &str, name: &str) -> String;

    /// Help page for setting up SSH credentials.
    fn credential_setup_url(&self) -> &str;

    /// Page where access tokens are issued.
    fn token_issuance_url(&self) -> &str;
}
