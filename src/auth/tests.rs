//! Tests for the auth module

use super::*;
use crate::config::{ApiConfig, Credentials};
use crate::error::Error;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> TokenProvider {
    let config = ApiConfig::new().with_token_url(format!("{}/oauth2/token", server.uri()));
    TokenProvider::new(Credentials::new("my-client", "my-secret"), &config)
}

#[tokio::test]
async fn test_token_exchange_sends_credentials_as_query_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(query_param("grant_type", "client_credentials"))
        .and(query_param("client_id", "my-client"))
        .and(query_param("client_secret", "my-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "app-token-123",
            "expires_in": 5_184_000,
            "token_type": "bearer"
        })))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server);
    let token = provider.acquire().await.unwrap();

    assert_eq!(token.token, "app-token-123");
    assert!(token.expires_at.is_some());
    assert!(!token.is_expired());
}

#[tokio::test]
async fn test_token_is_cached_across_acquires() {
    let mock_server = MockServer::start().await;

    // This should only be called once due to caching
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "cached-token",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server);

    let first = provider.acquire().await.unwrap();
    let second = provider.acquire().await.unwrap();
    let third = provider.acquire().await.unwrap();

    assert_eq!(first.token, "cached-token");
    assert_eq!(second.token, first.token);
    assert_eq!(third.token, first.token);
}

#[tokio::test]
async fn test_clear_cache_forces_new_exchange() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "token",
            "expires_in": 3600
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server);

    let _ = provider.acquire().await.unwrap();
    provider.clear_cache().await;
    let _ = provider.acquire().await.unwrap();
}

#[tokio::test]
async fn test_token_without_expiry_never_expires() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "forever-token"
        })))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server);
    let token = provider.acquire().await.unwrap();

    assert_eq!(token.expires_at, None);
    assert!(!token.is_expired());
}

#[tokio::test]
async fn test_exchange_failure_is_fatal_auth_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "status": 403,
            "message": "invalid client secret"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server);
    let err = provider.acquire().await.unwrap_err();

    assert!(matches!(err, Error::Auth { .. }));
    assert!(err.to_string().contains("403"));
    assert!(err.to_string().contains("invalid client secret"));
}

#[tokio::test]
async fn test_malformed_token_payload_is_auth_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "no token here"
        })))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server);
    let err = provider.acquire().await.unwrap_err();

    assert!(matches!(err, Error::Auth { .. }));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_auth_error() {
    // Port 9 is discard; nothing is listening there.
    let config = ApiConfig::new().with_token_url("http://127.0.0.1:9/oauth2/token");
    let provider = TokenProvider::new(Credentials::new("id", "secret"), &config);

    let err = provider.acquire().await.unwrap_err();
    assert!(matches!(err, Error::Auth { .. }));
}
