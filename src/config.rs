//! Exporter configuration
//!
//! Credentials and API tuning are explicit, validated structs. Nothing in
//! this module reads the environment implicitly; `Credentials::resolve`
//! is the single place where environment variables are consulted, and a
//! missing value fails fast naming the exact variable.

use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use std::time::Duration;

/// Environment variable holding the Twitch client id
pub const ENV_CLIENT_ID: &str = "TWITCH_CLIENT_ID";

/// Environment variable holding the Twitch client secret
pub const ENV_CLIENT_SECRET: &str = "TWITCH_CLIENT_SECRET";

/// Default OAuth2 token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.igdb.com/v4";

// ============================================================================
// Credentials
// ============================================================================

/// OAuth2 client credentials for the token exchange
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Application client id (also sent as the `Client-ID` header)
    pub client_id: String,
    /// Application client secret
    pub client_secret: String,
}

impl Credentials {
    /// Create credentials from explicit values
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Read both credentials from the environment
    pub fn from_env() -> Result<Self> {
        Self::resolve(None, None)
    }

    /// Build credentials from explicit overrides, falling back to the
    /// environment for whichever part is not given. Empty strings count
    /// as not given.
    pub fn resolve(client_id: Option<String>, client_secret: Option<String>) -> Result<Self> {
        let client_id = match client_id.none_if_empty() {
            Some(id) => id,
            None => env_var(ENV_CLIENT_ID)?,
        };
        let client_secret = match client_secret.none_if_empty() {
            Some(secret) => secret,
            None => env_var(ENV_CLIENT_SECRET)?,
        };
        let creds = Self {
            client_id,
            client_secret,
        };
        creds.validate()?;
        Ok(creds)
    }

    /// Check that both parts are non-empty
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(Error::missing_field(ENV_CLIENT_ID));
        }
        if self.client_secret.is_empty() {
            return Err(Error::missing_field(ENV_CLIENT_SECRET));
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::missing_field(name)),
    }
}

// ============================================================================
// API Config
// ============================================================================

/// Endpoints, timeouts and pacing for the exporter
///
/// The two sleep intervals live here so tests can shrink them to
/// milliseconds instead of waiting out real delays.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// OAuth2 token endpoint
    pub token_url: String,
    /// Base URL for data requests; endpoint names are appended to this
    pub base_url: String,
    /// Timeout for the token exchange
    pub auth_timeout: Duration,
    /// Timeout for each page request
    pub request_timeout: Duration,
    /// Fixed delay before retrying a rate-limited (429) request
    pub retry_backoff: Duration,
    /// Fixed delay between consecutive page requests
    pub page_delay: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(90),
            retry_backoff: Duration::from_secs(1),
            page_delay: Duration::from_millis(350),
            user_agent: format!("igdb-export/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiConfig {
    /// Create a config with default endpoints and timing
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the token endpoint
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Set the data base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the token exchange timeout
    #[must_use]
    pub fn with_auth_timeout(mut self, timeout: Duration) -> Self {
        self.auth_timeout = timeout;
        self
    }

    /// Set the page request timeout
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the 429 retry backoff
    #[must_use]
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Set the inter-page delay
    #[must_use]
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Check that both URLs parse
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.token_url)
            .map_err(|e| Error::invalid_value("token_url", e.to_string()))?;
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::invalid_value("base_url", e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_config_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.auth_timeout, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Duration::from_secs(90));
        assert_eq!(config.retry_backoff, Duration::from_secs(1));
        assert_eq!(config.page_delay, Duration::from_millis(350));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_config_builder() {
        let config = ApiConfig::new()
            .with_base_url("http://localhost:9000")
            .with_retry_backoff(Duration::from_millis(5))
            .with_page_delay(Duration::ZERO);
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.retry_backoff, Duration::from_millis(5));
        assert_eq!(config.page_delay, Duration::ZERO);
    }

    #[test]
    fn test_api_config_rejects_bad_url() {
        let config = ApiConfig::new().with_base_url("not a url");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_credentials_validate() {
        assert!(Credentials::new("id", "secret").validate().is_ok());

        let err = Credentials::new("", "secret").validate().unwrap_err();
        assert!(err.to_string().contains(ENV_CLIENT_ID));

        let err = Credentials::new("id", "").validate().unwrap_err();
        assert!(err.to_string().contains(ENV_CLIENT_SECRET));
    }

    #[test]
    fn test_credentials_resolve_prefers_explicit_values() {
        let creds =
            Credentials::resolve(Some("cli-id".to_string()), Some("cli-secret".to_string()))
                .unwrap();
        assert_eq!(creds.client_id, "cli-id");
        assert_eq!(creds.client_secret, "cli-secret");
    }

    #[test]
    fn test_credentials_from_env() {
        // Single test owns these variables so parallel tests cannot race.
        std::env::set_var(ENV_CLIENT_ID, "env-id");
        std::env::set_var(ENV_CLIENT_SECRET, "env-secret");
        let creds = Credentials::from_env().unwrap();
        assert_eq!(creds.client_id, "env-id");
        assert_eq!(creds.client_secret, "env-secret");

        // An empty override behaves like no override at all.
        let creds = Credentials::resolve(Some(String::new()), None).unwrap();
        assert_eq!(creds.client_id, "env-id");

        std::env::remove_var(ENV_CLIENT_SECRET);
        let err = Credentials::from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_CLIENT_SECRET));

        std::env::remove_var(ENV_CLIENT_ID);
        let err = Credentials::resolve(None, Some("x".to_string())).unwrap_err();
        assert!(err.to_string().contains(ENV_CLIENT_ID));
    }
}
