//! Reward Cloud HTTP client

use log::debug;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::api;
use crate::error::{CloudError, Result};

/// Reward Cloud API client
///
/// The bearer token is attached per client value: `with_token` returns a new
/// client sharing the connection pool, the original is left untouched.
#[derive(Clone)]
pub struct CloudClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
    /// Custom base URL override (for testing with mock servers)
    base_url_override: Option<String>,
}

impl CloudClient {
    /// Create a new unauthenticated client for the given endpoint host
    pub fn new(endpoint: &str) -> Self {
        let client = Client::builder()
            .user_agent(api::USER_AGENT)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .connect_timeout(api::CONNECT_TIMEOUT)
            .timeout(api::REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint: endpoint.to_string(),
            token: None,
            base_url_override: None,
        }
    }

    /// Create a client with custom base URL (for testing with mock servers)
    pub fn with_base_url(endpoint: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            token: None,
            base_url_override: Some(base_url.to_string()),
        }
    }

    /// Return a client carrying the given bearer token
    pub fn with_token(&self, token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            ..self.clone()
        }
    }

    /// The bearer token attached to this client, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the base URL for API requests
    pub(crate) fn base_url(&self) -> String {
        if let Some(ref url) = self.base_url_override {
            return url.clone();
        }
        format!(
            "https://{}/{}",
            self.endpoint,
            api::BASE_PATH.trim_start_matches('/')
        )
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Add standard headers to a request builder
    fn with_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.header("Accept", "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub(crate) fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.with_headers(self.client.get(url))
    }

    pub(crate) fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.with_headers(self.client.post(url))
    }

    pub(crate) fn put(&self, url: &str) -> reqwest::RequestBuilder {
        self.with_headers(self.client.put(url))
    }

    pub(crate) fn patch(&self, url: &str) -> reqwest::RequestBuilder {
        self.with_headers(self.client.patch(url))
    }

    /// Parse an API response, mapping 401 to the unauthorized sentinel
    pub(crate) async fn parse_api_response<T>(
        &self,
        response: reqwest::Response,
        error_context: &str,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            debug!("Unauthorized response for {}", error_context);
            return Err(CloudError::Unauthorized);
        }
        if !status.is_success() {
            return Err(CloudError::Api {
                status: status.as_u16(),
                message: format!("Failed to fetch {}", error_context),
            });
        }
        Ok(response.json().await?)
    }

    /// GET a JSON document by API path
    pub(crate) async fn fetch<T>(&self, path: &str, label: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("Fetching {} from: {}", label, url);

        let response = self.get(&url).send().await?;
        self.parse_api_response(response, label).await
    }

    /// Send a mutating request and ignore the response body
    pub(crate) async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        label: &str,
    ) -> Result<()> {
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(CloudError::Unauthorized);
        }
        if !status.is_success() {
            return Err(CloudError::Api {
                status: status.as_u16(),
                message: format!("Failed to {}", label),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for CloudClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudClient")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "****"))
            .finish()
    }
}

#[cfg(test)]
impl CloudClient {
    /// Create a test client with mock base URL
    pub fn test_client(base_url: &str) -> Self {
        Self::with_base_url("mock.rewardcloud.test", base_url)
    }
}
