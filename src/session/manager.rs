//! Token lifecycle: cached token, live validation, login

use log::{debug, info};

use crate::cloud::{CloudClient, Credentials};
use crate::error::{CloudError, Result, ResultExt};
use crate::settings::Settings;
use crate::ui::Prompt;

use super::token_store::TokenStore;

/// Check a token with a harmless authenticated read.
///
/// `Ok(false)` only for the unauthorized sentinel; every other failure propagates.
pub async fn validate_token(client: &CloudClient) -> Result<bool> {
    match client.list_projects(None, None).await {
        Ok(_) => Ok(true),
        Err(e) if e.is_unauthorized() => Ok(false),
        Err(e) => Err(e.context("checking token")),
    }
}

/// Owns the bearer token: hands out clients that carry a valid one
pub struct SessionManager<'a> {
    client: CloudClient,
    store: TokenStore,
    id: Option<String>,
    password: Option<String>,
    prompt: &'a dyn Prompt,
}

impl<'a> SessionManager<'a> {
    pub fn new(settings: &Settings, prompt: &'a dyn Prompt) -> Self {
        Self::with_client(
            CloudClient::new(&settings.endpoint),
            settings.token_store(),
            settings.id.clone(),
            settings.password.clone(),
            prompt,
        )
    }

    /// Build from explicit parts (custom client, e.g. a mock server)
    pub fn with_client(
        client: CloudClient,
        store: TokenStore,
        id: Option<String>,
        password: Option<String>,
        prompt: &'a dyn Prompt,
    ) -> Self {
        Self {
            client,
            store,
            id,
            password,
            prompt,
        }
    }

    /// Unauthenticated client for the configured endpoint
    pub fn client(&self) -> &CloudClient {
        &self.client
    }

    /// Return a client carrying a token the API currently accepts.
    ///
    /// A valid cached token is reused as is; otherwise log in and cache the new one.
    pub async fn ensure_session(&self) -> Result<CloudClient> {
        if let Some(token) = self.store.read()? {
            let authed = self.client.with_token(&token);
            if validate_token(&authed).await.context("validating token")? {
                debug!("Cached token is valid");
                return Ok(authed);
            }
            info!("Token is invalid. Please log in...");
        } else {
            debug!("No cached token, logging in");
        }

        self.login().await.context("logging in")
    }

    /// Exchange credentials for a new token, verify it and cache it
    pub async fn login(&self) -> Result<CloudClient> {
        info!("Logging in to {}...", self.client.endpoint());

        let credentials = self.resolve_credentials()?;
        let token = self
            .client
            .issue_token(&credentials)
            .await
            .context("getting token")?;
        info!("...successfully logged in.");

        let authed = self.client.with_token(&token);
        if !validate_token(&authed).await.context("validating token")? {
            return Err(CloudError::Token("token is not valid".to_string()));
        }

        self.store
            .write(&token)
            .context("writing token to file")?;
        Ok(authed)
    }

    /// Configured identifier and secret, prompting for whichever is missing
    pub fn resolve_credentials(&self) -> Result<Credentials> {
        let id = match non_empty(&self.id) {
            Some(id) => id.to_string(),
            None => self
                .prompt
                .input("Username or email", false)
                .context("getting username")?,
        };
        let password = match non_empty(&self.password) {
            Some(password) => password.to_string(),
            None => self
                .prompt
                .password("Password")
                .context("getting password")?,
        };

        Ok(Credentials {
            id: id.trim().to_string(),
            password: password.trim().to_string(),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
