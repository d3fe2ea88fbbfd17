//! build::artifacts
//!
//! Artifact index lookup.
//!
//! Before a production build the engine asks whether the project already
//! has a published object, so the user can confirm the overwrite.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::BuildError;

/// Read access to the remote artifact store.
#[async_trait]
pub trait ArtifactIndex: Send + Sync {
    /// Whether a production artifact named `name` already exists.
    async fn has_published(&self, name: &str) -> Result<bool, BuildError>;
}

/// [`ArtifactIndex`] backed by the build service HTTP endpoint.
///
/// `GET <index_url>?name=<name>&type=prod` returns a JSON array of stored
/// objects.
#[derive(Debug, Clone)]
pub struct HttpArtifactIndex {
    client: reqwest::Client,
    index_url: String,
}

impl HttpArtifactIndex {
    pub fn new(index_url: impl Into<String>) -> Result<Self, BuildError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .user_agent(concat!("shipyard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BuildError::ArtifactIndex(e.to_string()))?;
        Ok(Self {
            client,
            index_url: index_url.into(),
        })
    }
}

#[async_trait]
impl ArtifactIndex for HttpArtifactIndex {
    async fn has_published(&self, name: &str) -> Result<bool, BuildError> {
        let response = self
            .client
            .get(&self.index_url)
            .query(&[("name", name), ("type", "prod")])
            .send()
            .await
            .map_err(|e| BuildError::ArtifactIndex(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BuildError::ArtifactIndex(format!(
                "HTTP {} from {}",
                status.as_u16(),
                self.index_url
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| BuildError::ArtifactIndex(format!("invalid response: {}", e)))?;

        match body {
            Value::Array(items) => Ok(!items.is_empty()),
            other => Err(BuildError::ArtifactIndex(format!(
                "expected a JSON array, got {}",
                kind_of(&other)
            ))),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Fixed-answer index for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticArtifactIndex {
    published: Vec<String>,
}

impl StaticArtifactIndex {
    pub fn new<I, S>(published: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            published: published.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl ArtifactIndex for StaticArtifactIndex {
    async fn has_published(&self, name: &str) -> Result<bool, BuildError> {
        Ok(self.published.iter().any(|p| p == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn non_empty_array_means_published() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/project/oss"))
            .and(query_param("name", "widget"))
            .and(query_param("type", "prod"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{"name": "widget"}])))
            .mount(&server)
            .await;

        let index = HttpArtifactIndex::new(format!("{}/project/oss", server.uri())).unwrap();
        assert!(index.has_published("widget").await.unwrap());
    }

    #[tokio::test]
    async fn empty_array_means_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let index = HttpArtifactIndex::new(server.uri()).unwrap();
        assert!(!index.has_published("widget").await.unwrap());
    }

    #[tokio::test]
    async fn non_array_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
            .mount(&server)
            .await;

        let index = HttpArtifactIndex::new(server.uri()).unwrap();
        let err = index.has_published("widget").await.unwrap_err();
        assert!(err.to_string().contains("an object"));
    }

    #[tokio::test]
    async fn http_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let index = HttpArtifactIndex::new(server.uri()).unwrap();
        assert!(matches!(
            index.has_published("widget").await,
            Err(BuildError::ArtifactIndex(_))
        ));
    }

    #[tokio::test]
    async fn static_index() {
        let index = StaticArtifactIndex::new(["widget"]);
        assert!(index.has_published("widget").await.unwrap());
        assert!(!index.has_published("gadget").await.unwrap());
    }
}
