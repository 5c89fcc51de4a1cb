//! Token provider implementation
//!
//! Performs the client-credentials exchange and caches the resulting app
//! access token for the lifetime of the provider.

use super::types::AppToken;
use crate::config::{ApiConfig, Credentials};
use crate::error::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Acquires and caches the app access token
pub struct TokenProvider {
    /// Client credentials for the exchange
    credentials: Credentials,
    /// OAuth2 token endpoint
    token_url: String,
    /// Cached token, shared across clones of the provider
    cached_token: Arc<RwLock<Option<AppToken>>>,
    /// HTTP client for token requests
    http_client: Client,
}

impl TokenProvider {
    /// Create a new provider with its own HTTP client
    pub fn new(credentials: Credentials, config: &ApiConfig) -> Self {
        let http_client = Client::builder()
            .timeout(config.auth_timeout)
            .user_agent(&config.user_agent)
            .build()
            .expect("Failed to build HTTP client");
        Self::with_client(credentials, config, http_client)
    }

    /// Create a provider with a custom HTTP client
    pub fn with_client(credentials: Credentials, config: &ApiConfig, http_client: Client) -> Self {
        Self {
            credentials,
            token_url: config.token_url.clone(),
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Get a valid token, exchanging credentials on first use
    pub async fn acquire(&self) -> Result<AppToken> {
        // Check if we have a valid cached token
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.clone());
                }
            }
        }

        let mut cached = self.cached_token.write().await;

        // Double-check after acquiring write lock (another task might have exchanged)
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.clone());
            }
        }

        let token = self.exchange().await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    /// POST the client-credentials exchange
    ///
    /// The parameters go in the query string; that is the form the token
    /// endpoint accepts. Exactly one network call, no retry: transport
    /// errors, non-success statuses and malformed payloads are all fatal.
    async fn exchange(&self) -> Result<AppToken> {
        debug!("Requesting app access token from {}", self.token_url);

        let response = self
            .http_client
            .post(&self.token_url)
            .query(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| Error::auth(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::auth(format!(
                "Token request failed with status {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::auth(format!("Malformed token response: {e}")))?;

        debug!("Token acquired");
        Ok(token_response.into_app_token())
    }

    /// Clear the cached token (useful for testing or forced refresh)
    pub async fn clear_cache(&self) {
        let mut cached = self.cached_token.write().await;
        *cached = None;
    }
}

/// OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: Option<String>,
}

impl TokenResponse {
    fn into_app_token(self) -> AppToken {
        match self.expires_in {
            Some(secs) => AppToken::expires_in(self.access_token, secs),
            None => AppToken::new(self.access_token, None),
        }
    }
}
