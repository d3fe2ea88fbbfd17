//! forge::gitee
//!
//! Gitee forge implementation using the v5 REST API.
//!
//! Organizations are listed per user (`GET /users/{login}/orgs`) rather
//! than for the authenticated session.

use async_trait::async_trait;

use super::rest::{CreateRepoBody, RestClient};
use super::traits::{Forge, ForgeError, Organization, RemoteUser, Repository};

/// Default Gitee API base URL.
pub const DEFAULT_API_BASE: &str = "https://gitee.com/api/v5";

const ACCEPT_VALUE: &str = "application/json";

const SSH_KEY_HELP_URL: &str =
    "https://help.gitee.com/base/account/SSH%E5%85%AC%E9%92%A5%E8%AE%BE%E7%BD%AE";

pub(super) const TOKEN_URL: &str = "https://gitee.com/profile/personal_access_tokens";

/// Gitee forge implementation.
#[derive(Debug)]
pub struct GiteeForge {
    rest: RestClient,
}

impl GiteeForge {
    pub fn new(token: impl Into<String>) -> Result<Self, ForgeError> {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

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
impl Forge for GiteeForge {
    fn name(&self) -> &'static str {
        "gitee"
    }

    async fn get_user(&self) -> Result<RemoteUser, ForgeError> {
        self.rest.get("/user", &[]).await
    }

    async fn get_organizations(&self, user: &RemoteUser) -> Result<Vec<Organization>, ForgeError> {
        self.rest
            .get(
                &format!("/users/{}/orgs", user.login),
                &[("page", "1"), ("per_page", "100")],
            )
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
        format!("git@gitee.com:{}/{}.git", owner, name)
    }

    fn credential_setup_url(&self) -> &str {
        SSH_KEY_HELP_URL
    }

    fn token_issuance_url(&self) -> &str {
        TOKEN_URL
    }
}
