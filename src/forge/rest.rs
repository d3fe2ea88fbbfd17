//! forge::rest
//!
//! Bearer-authenticated JSON client shared by the platform implementations.
//!
//! # Status mapping
//!
//! | Status | Error |
//! |--------|-------|
//! | 401, 403 | [`ForgeError::AuthFailed`] |
//! | 404 | [`ForgeError::NotFound`] (or `Ok(None)` via [`RestClient::get_optional`]) |
//! | 429 | [`ForgeError::RateLimited`] |
//! | other | [`ForgeError::ApiError`] |

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::traits::ForgeError;

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "shipyard-cli";

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Error payload returned by both platforms.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// JSON client for one API base with one token.
pub struct RestClient {
    client: Client,
    api_base: String,
    token: String,
    accept: &'static str,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("api_base", &self.api_base)
            .field("has_token", &!self.token.is_empty())
            .finish()
    }
}

impl RestClient {
    /// Create a client.
    ///
    /// `accept` is the media type sent in the `Accept` header.
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        accept: &'static str,
    ) -> Result<Self, ForgeError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ForgeError::AuthRequired);
        }
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
            accept,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| ForgeError::AuthFailed("token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static(self.accept));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        Ok(headers)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ForgeError> {
        request
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))
    }

    /// GET and decode, treating every non-success status as an error.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ForgeError> {
        tracing::debug!(path, "GET");
        let response = self.send(self.client.get(self.url(path)).query(query)).await?;
        Self::handle_response(response).await
    }

    /// GET and decode, mapping 404 to `Ok(None)`.
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, ForgeError> {
        tracing::debug!(path, "GET");
        let response = self.send(self.client.get(self.url(path))).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::handle_response(response).await.map(Some)
    }

    /// POST a JSON body and decode the response.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ForgeError> {
        tracing::debug!(path, "POST");
        let response = self.send(self.client.post(self.url(path)).json(body)).await?;
        Self::handle_response(response).await
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, ForgeError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            Self::handle_error_response(response, status).await
        }
    }

    /// Handle an error response from the API.
    async fn handle_error_response<T>(
        response: Response,
        status: StatusCode,
    ) -> Result<T, ForgeError> {
        let message = match response.json::<ErrorBody>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        Err(match status {
            StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN => ForgeError::AuthFailed(format!("Permission denied: {}", message)),
            StatusCode::NOT_FOUND => ForgeError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
            _ if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("server error: {}", message),
            },
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        })
    }
}

/// Body for repository creation on both platforms.
#[derive(Debug, Serialize)]
pub struct CreateRepoBody<'a> {
    pub name: &'a str,
    pub private: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_is_auth_required() {
        let result = RestClient::new("https://api.github.com", "  ", "application/json");
        assert!(matches!(result, Err(ForgeError::AuthRequired)));
    }

    #[test]
    fn debug_redacts_token() {
        let client = RestClient::new("https://api.github.com/", "ghp_secret", "application/json")
            .unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("has_token"));
        assert_eq!(client.api_base(), "https://api.github.com");
    }
}
