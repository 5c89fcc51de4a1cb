//! HTTP page fetcher
//!
//! POSTs the rendered query text to `{base_url}/{endpoint}` and decodes
//! the JSON array response. HTTP 429 is retried indefinitely after a
//! fixed backoff; every other non-success status fails the run.

use super::PageFetcher;
use crate::auth::AppToken;
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::query::QuerySpec;
use crate::types::{JsonValue, Record};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Page fetcher backed by a reqwest client
pub struct HttpFetcher {
    /// Shared HTTP client
    client: Client,
    /// Application client id, sent as the `Client-ID` header
    client_id: String,
    /// Base URL that endpoint names are appended to
    base_url: String,
    /// Fixed delay before retrying a 429
    retry_backoff: Duration,
}

impl HttpFetcher {
    /// Create a fetcher with its own HTTP client
    pub fn new(client_id: impl Into<String>, config: &ApiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .build()
            .expect("Failed to build HTTP client");
        Self::with_client(client_id, config, client)
    }

    /// Create a fetcher with a custom HTTP client
    pub fn with_client(client_id: impl Into<String>, config: &ApiConfig, client: Client) -> Self {
        Self {
            client,
            client_id: client_id.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry_backoff: config.retry_backoff,
        }
    }

    fn page_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(
        &self,
        query: &QuerySpec,
        offset: u64,
        token: &AppToken,
    ) -> Result<Vec<Record>> {
        let url = self.page_url(&query.endpoint);
        let body = query.body(offset);

        loop {
            debug!("POST {} offset={}", url, offset);

            let response = self
                .client
                .post(&url)
                .header("Client-ID", &self.client_id)
                .bearer_auth(&token.token)
                .header(header::ACCEPT, "application/json")
                .body(body.clone())
                .send()
                .await?;

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!(
                    "Rate limited (429) on {}, retrying in {:?}",
                    query.endpoint, self.retry_backoff
                );
                tokio::time::sleep(self.retry_backoff).await;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::http_status(status.as_u16(), body));
            }

            let payload: JsonValue = response.json().await?;
            return decode_records(payload);
        }
    }
}

/// Interpret the response payload as an array of record objects
fn decode_records(payload: JsonValue) -> Result<Vec<Record>> {
    let items = match payload {
        JsonValue::Array(items) => items,
        other => {
            return Err(Error::decode(format!(
                "expected a JSON array, got {}",
                json_type_name(&other)
            )))
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            JsonValue::Object(record) => Ok(record),
            other => Err(Error::decode(format!(
                "expected an object element, got {}",
                json_type_name(&other)
            ))),
        })
        .collect()
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
