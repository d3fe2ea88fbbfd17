//! forge::github
//!
//! GitHub forge implementation using the REST API.
//!
//! # Endpoints
//!
//! - `GET /user`
//! - `GET /user/orgs?page=1&per_page=100`
//! - `GET /repos/{owner}/{repo}`
//! - `POST /user/repos`
//! - `POST /orgs/{org}/repos`
//!
//! # Rate Limiting
//!
//! Returns `ForgeError::RateLimited` when limits are hit. No automatic
//! retry is attempted.

use async_trait::async_trait;

use super::rest::{CreateRepoBody, RestClient};
use super::traits::{Forge, ForgeError, Organization, RemoteUser, Repository};

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const ACCEPT_VALUE: &str = "application/vnd.github+json";

const SSH_KEY_HELP_URL: &str = "https://docs.github.com/en/authentication/connecting-to-github-with-ssh/generating-a-new-ssh-key-and-adding-it-to-the-ssh-agent";

pub(super) const TOKEN_URL: &str = "https://github.com/settings/tokens";

/// GitHub forge implementation.
#[derive(Debug)]
pub struct GitHubForge {
    rest: RestClient,
}

impl GitHubForge {
    /// Create a forge against the public API.
    pub fn new(token: impl Into<String>) -> Result<Self, ForgeError> {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Create a forge against a custom API base (GitHub Enterprise, tests).
    pub fn with_api_base(
        token: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self, ForgeError> {
        Ok(Self {
            rest: RestClient::new(api_base, token, ACCEPT_VALUE)?,
        })
    }

    pub fn api_base(&self) -> &str {
        self.rest.api_base()
    }
}

#[async_trait]
impl Forge for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn get_user(&self) -> Result<RemoteUser, ForgeError> {
        self.rest.get("/user", &[]).await
    }

    async fn get_organizations(&self, _user: &RemoteUser) -> Result<Vec<Organization>, ForgeError> {
        self.rest
            .get("/user/orgs", &[("page", "1"), ("per_page", "100")])
            .await
    }

    async fn get_repository(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Option<Repository>, ForgeError> {
        self.rest
            .get_optional(&format!("/repos/{}/{}", owner, name))
            .await
    }

    async fn create_user_repository(&self, name: &str) -> Result<Repository, ForgeError> {
        let body = CreateRepoBody {
            name,
            private: false,
        };
        self.rest.post("/user/repos", &body).await
    }

    async fn create_organization_repository(
        &self,
        name: &str,
        org: &str,
    ) -> Result<Repository, ForgeError> {
        let body = CreateRepoBody {
            name,
            private: false,
        };
        self.rest.post(&format!("/orgs/{}/repos", org), &body).await
    }

    fn clone_url(&self, owner: &str, name: &str) -> String {
        format!("git@github.com:{}/{}.git", owner, name)
    }

    fn credential_setup_url(&self) -> &str {
        SSH_KEY_HELP_URL
    }

    fn token_issuance_url(&self) -> &str {
        TOKEN_URL
    }
}
