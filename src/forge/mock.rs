//! forge::mock
//!
//! Mock forge implementation for deterministic testing.
//!
//! # Design
//!
//! The mock forge keeps a user, its organizations and a set of repositories
//! in memory, records every call, and can be configured to fail a specific
//! operation. The clone URL base is configurable so tests can point the
//! remote at a local bare repository.
//!
//! # Example
//!
//! ```
//! use shipyard::forge::mock::MockForge;
//! use shipyard::forge::Forge;
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new("ada").with_orgs(["acme"]);
//!
//! assert!(forge.get_repository("acme", "widget").await.unwrap().is_none());
//! forge.create_organization_repository("widget", "acme").await.unwrap();
//! assert!(forge.get_repository("acme", "widget").await.unwrap().is_some());
//! assert_eq!(forge.create_count(), 1);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use super::traits::{Forge, ForgeError, Organization, RemoteUser, Repository, RepositoryOwner};

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockForge {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockForgeInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockForgeInner {
    user: RemoteUser,
    orgs: Vec<Organization>,
    /// Existing repositories as (owner, name).
    repos: BTreeSet<(String, String)>,
    /// Prefix for clone URLs; `None` yields `git@mock.test:` style URLs.
    clone_base: Option<String>,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    GetUser(ForgeError),
    GetOrganizations(ForgeError),
    GetRepository(ForgeError),
    CreateUserRepository(ForgeError),
    CreateOrganizationRepository(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    GetUser,
    GetOrganizations { login: String },
    GetRepository { owner: String, name: String },
    CreateUserRepository { name: String },
    CreateOrganizationRepository { name: String, org: String },
}

impl MockForge {
    /// Create a mock forge for the account `login`.
    pub fn new(login: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockForgeInner {
                user: RemoteUser {
                    login: login.to_string(),
                    name: None,
                },
                orgs: Vec::new(),
                repos: BTreeSet::new(),
                clone_base: None,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockForgeInner> {
        // A poisoned lock only happens after a panicking test thread
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add organizations the account belongs to.
    pub fn with_orgs<I, S>(self, orgs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().orgs.extend(orgs.into_iter().map(|o| Organization {
            login: o.into(),
        }));
        self
    }

    /// Mark `owner/name` as already existing.
    pub fn with_repo(self, owner: &str, name: &str) -> Self {
        self.lock()
            .repos
            .insert((owner.to_string(), name.to_string()));
        self
    }

    /// Clone URLs become `<base>/<owner>/<name>.git`.
    pub fn with_clone_base(self, base: impl Into<String>) -> Self {
        self.lock().clone_base = Some(base.into());
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use shipyard::forge::mock::{MockForge, FailOn};
    /// use shipyard::forge::ForgeError;
    ///
    /// let forge = MockForge::new("ada")
    ///     .fail_on(FailOn::GetUser(ForgeError::RateLimited));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.lock().fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Number of repository creation calls, successful or not.
    pub fn create_count(&self) -> usize {
        self.lock()
            .operations
            .iter()
            .filter(|op| {
                matches!(
                    op,
                    MockOperation::CreateUserRepository { .. }
                        | MockOperation::CreateOrganizationRepository { .. }
                )
            })
            .count()
    }

    fn record(&self, op: MockOperation) {
        self.lock().operations.push(op);
    }

    fn check_fail(&self, pick: impl Fn(&FailOn) -> Option<ForgeError>) -> Result<(), ForgeError> {
        match self.lock().fail_on.as_ref().and_then(pick) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn repository(owner: &str, name: &str, ssh_url: String) -> Repository {
        Repository {
            name: name.to_string(),
            full_name: format!("{}/{}", owner, name),
            owner: RepositoryOwner {
                login: owner.to_string(),
            },
            ssh_url: Some(ssh_url),
            html_url: None,
        }
    }

    fn create(&self, owner: &str, name: &str) -> Result<Repository, ForgeError> {
        let inserted = self
            .lock()
            .repos
            .insert((owner.to_string(), name.to_string()));
        if !inserted {
            return Err(ForgeError::ApiError {
                status: 422,
                message: "name already exists on this account".to_string(),
            });
        }
        Ok(Self::repository(owner, name, self.clone_url(owner, name)))
    }
}

#[async_trait]
impl Forge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_user(&self) -> Result<RemoteUser, ForgeError> {
        self.record(MockOperation::GetUser);
        self.check_fail(|f| match f {
            FailOn::GetUser(e) => Some(e.clone()),
            _ => None,
        })?;
        Ok(self.lock().user.clone())
    }

    async fn get_organizations(&self, user: &RemoteUser) -> Result<Vec<Organization>, ForgeError> {
        self.record(MockOperation::GetOrganizations {
            login: user.login.clone(),
        });
        self.check_fail(|f| match f {
            FailOn::GetOrganizations(e) => Some(e.clone()),
            _ => None,
        })?;
        Ok(self.lock().orgs.clone())
    }

    async fn get_repository(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Option<Repository>, ForgeError> {
        self.record(MockOperation::GetRepository {
            owner: owner.to_string(),
            name: name.to_string(),
        });
        self.check_fail(|f| match f {
            FailOn::GetRepository(e) => Some(e.clone()),
            _ => None,
        })?;
        let exists = self
            .lock()
            .repos
            .contains(&(owner.to_string(), name.to_string()));
        Ok(exists.then(|| Self::repository(owner, name, self.clone_url(owner, name))))
    }

    async fn create_user_repository(&self, name: &str) -> Result<Repository, ForgeError> {
        self.record(MockOperation::CreateUserRepository {
            name: name.to_string(),
        });
        self.check_fail(|f| match f {
            FailOn::CreateUserRepository(e) => Some(e.clone()),
            _ => None,
        })?;
        let login = self.lock().user.login.clone();
        self.create(&login, name)
    }

    async fn create_organization_repository(
        &self,
        name: &str,
        org: &str,
    ) -> Result<Repository, ForgeError> {
        self.record(MockOperation::CreateOrganizationRepository {
            name: name.to_string(),
            org: org.to_string(),
        });
        self.check_fail(|f| match f {
            FailOn::CreateOrganizationRepository(e) => Some(e.clone()),
            _ => None,
        })?;
        self.create(org, name)
    }

    fn clone_url(&self, owner: &str, name: &str) -> String {
        match &self.lock().clone_base {
            Some(base) => format!("{}/{}/{}.git", base.trim_end_matches('/'), owner, name),
            None => format!("git@mock.test:{}/{}.git", owner, name),
        }
    }

    fn credential_setup_url(&self) -> &str {
        "https://mock.test/ssh"
    }

    fn token_issuance_url(&self) -> &str {
        "https://mock.test/tokens"
    }
}
