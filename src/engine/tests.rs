//! Tests for engine module

use super::*;
use crate::auth::AppToken;
use crate::config::{ApiConfig, Credentials};
use crate::error::Error;
use crate::types::Record;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Test Helpers
// ============================================================================

/// Replays a scripted sequence of pages and records the offsets asked for.
/// Once the script runs out it returns empty pages.
#[derive(Clone)]
struct ScriptedFetcher {
    pages: Arc<Mutex<VecDeque<Result<Vec<Record>>>>>,
    offsets: Arc<Mutex<Vec<u64>>>,
}

impl ScriptedFetcher {
    fn new(pages: Vec<Result<Vec<Record>>>) -> Self {
        Self {
            pages: Arc::new(Mutex::new(pages.into())),
            offsets: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn offsets(&self) -> Vec<u64> {
        self.offsets.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_page(
        &self,
        _query: &QuerySpec,
        offset: u64,
        _token: &AppToken,
    ) -> Result<Vec<Record>> {
        self.offsets.lock().unwrap().push(offset);
        match self.pages.lock().unwrap().pop_front() {
            Some(page) => page,
            None => Ok(Vec::new()),
        }
    }
}

fn record(id: u64) -> Record {
    let mut r = Record::new();
    r.insert("id".to_string(), json!(id));
    r.insert("name".to_string(), json!(format!("game-{id}")));
    r
}

fn page(ids: std::ops::Range<u64>) -> Vec<Record> {
    ids.map(record).collect()
}

fn games_query() -> QuerySpec {
    QuerySpec::new("games", vec!["id".to_string(), "name".to_string()])
}

/// Start a mock token endpoint and a provider pointed at it
async fn token_provider() -> (MockServer, TokenProvider) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "engine-token",
            "expires_in": 3600,
            "token_type": "bearer"
        })))
        .mount(&server)
        .await;

    let config = ApiConfig::new().with_token_url(format!("{}/oauth2/token", server.uri()));
    let tokens = TokenProvider::new(Credentials::new("id", "secret"), &config);
    (server, tokens)
}

/// Engine over a scripted fetcher with pacing disabled
async fn engine_with(
    pages: Vec<Result<Vec<Record>>>,
) -> (MockServer, ScriptedFetcher, ExportEngine<ScriptedFetcher>) {
    let (server, tokens) = token_provider().await;
    let fetcher = ScriptedFetcher::new(pages);
    let engine = ExportEngine::new(fetcher.clone(), tokens).with_page_delay(Duration::ZERO);
    (server, fetcher, engine)
}

// ============================================================================
// ExportStats Tests
// ============================================================================

#[test]
fn test_export_stats_default() {
    let stats = ExportStats::new();
    assert_eq!(stats.rows_written, 0);
    assert_eq!(stats.pages_fetched, 0);
    assert_eq!(stats.tables_exported, 0);
    assert_eq!(stats.duration_ms, 0);
}

#[test]
fn test_export_stats_mutations() {
    let mut stats = ExportStats::new();

    stats.add_rows(100);
    assert_eq!(stats.rows_written, 100);

    stats.add_page();
    stats.add_page();
    assert_eq!(stats.pages_fetched, 2);

    stats.add_table();
    assert_eq!(stats.tables_exported, 1);

    stats.set_duration(1500);
    assert_eq!(stats.duration_ms, 1500);
}

// ============================================================================
// ExportEngine Tests
// ============================================================================

#[tokio::test]
async fn test_extract_drains_until_empty_page() {
    let (_server, fetcher, mut engine) =
        engine_with(vec![Ok(page(0..500)), Ok(page(500..1000)), Ok(Vec::new())]).await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("games.csv");

    let written = engine.extract(&games_query(), &dest).await.unwrap();

    assert_eq!(written, 1000);
    // Offset advances by page size, ending with the empty probe
    assert_eq!(fetcher.offsets(), vec![0, 500, 1000]);

    let contents = std::fs::read_to_string(&dest).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 1001);
    assert_eq!(lines[0], "id,name");
    assert_eq!(lines[1], "0,game-0");
    assert_eq!(lines[1000], "999,game-999");

    let stats = engine.stats();
    assert_eq!(stats.rows_written, 1000);
    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.tables_exported, 1);
}

#[tokio::test]
async fn test_extract_empty_table_leaves_no_file() {
    let (_server, fetcher, mut engine) = engine_with(vec![Ok(Vec::new())]).await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("games.csv");

    let written = engine.extract(&games_query(), &dest).await.unwrap();

    assert_eq!(written, 0);
    assert_eq!(fetcher.offsets(), vec![0]);
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_extract_row_cap_keeps_crossing_batch() {
    let (_server, fetcher, mut engine) =
        engine_with(vec![Ok(page(0..4)), Ok(page(4..8)), Ok(page(8..12))]).await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("games.csv");

    let query = games_query().with_page_size(4).with_row_cap(5);
    let written = engine.extract(&query, &dest).await.unwrap();

    // The batch that crosses the cap still lands in full
    assert_eq!(written, 8);
    assert_eq!(fetcher.offsets(), vec![0, 4]);
}

#[tokio::test]
async fn test_extract_row_cap_stops_after_first_page() {
    let (_server, fetcher, mut engine) = engine_with(vec![Ok(page(0..4))]).await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("games.csv");

    let query = games_query().with_page_size(4).with_row_cap(2);
    let written = engine.extract(&query, &dest).await.unwrap();

    assert_eq!(written, 4);
    assert_eq!(fetcher.offsets(), vec![0]);
}

#[tokio::test]
async fn test_extract_replaces_stale_destination() {
    let (_server, _fetcher, mut engine) =
        engine_with(vec![Ok(page(0..2)), Ok(Vec::new())]).await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("games.csv");
    std::fs::write(&dest, "old content\n").unwrap();

    engine.extract(&games_query(), &dest).await.unwrap();

    let contents = std::fs::read_to_string(&dest).unwrap();
    assert!(!contents.contains("old content"));
    assert_eq!(contents.lines().next(), Some("id,name"));
}

#[tokio::test]
async fn test_extract_error_keeps_partial_file() {
    let (_server, _fetcher, mut engine) = engine_with(vec![
        Ok(page(0..500)),
        Err(Error::http_status(500, "internal failure")),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("games.csv");

    let err = engine.extract(&games_query(), &dest).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));

    // Rows flushed before the failure survive on disk
    let contents = std::fs::read_to_string(&dest).unwrap();
    assert_eq!(contents.lines().count(), 501);
}

#[tokio::test]
async fn test_extract_rejects_invalid_query_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "unused"
        })))
        .expect(0)
        .mount(&server)
        .await;

    let config = ApiConfig::new().with_token_url(format!("{}/oauth2/token", server.uri()));
    let tokens = TokenProvider::new(Credentials::new("id", "secret"), &config);
    let fetcher = ScriptedFetcher::new(vec![Ok(page(0..1))]);
    let mut engine = ExportEngine::new(fetcher.clone(), tokens).with_page_delay(Duration::ZERO);

    let dir = tempfile::tempdir().unwrap();
    let query = games_query().with_page_size(0);
    let err = engine
        .extract(&query, dir.path().join("games.csv"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("page_size"));
    assert!(fetcher.offsets().is_empty());
}

#[tokio::test]
async fn test_extract_paces_between_pages() {
    let (_server, tokens) = token_provider().await;
    let fetcher = ScriptedFetcher::new(vec![Ok(page(0..2)), Ok(page(2..4)), Ok(Vec::new())]);
    let mut engine =
        ExportEngine::new(fetcher, tokens).with_page_delay(Duration::from_millis(30));

    let dir = tempfile::tempdir().unwrap();
    let start = Instant::now();
    engine
        .extract(&games_query(), dir.path().join("games.csv"))
        .await
        .unwrap();

    // One delay after each non-final page
    assert!(start.elapsed() >= Duration::from_millis(60));
}

#[tokio::test]
async fn test_extract_wildcard_derives_header_from_first_batch() {
    let (_server, _fetcher, mut engine) =
        engine_with(vec![Ok(page(0..2)), Ok(Vec::new())]).await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("games.csv");

    let query = QuerySpec::new("games", vec!["*".to_string()]);
    engine.extract(&query, &dest).await.unwrap();

    let contents = std::fs::read_to_string(&dest).unwrap();
    assert_eq!(contents.lines().next(), Some("id,name"));
}

#[tokio::test]
async fn test_extract_flattens_nested_values() {
    let mut nested = Record::new();
    nested.insert("id".to_string(), json!(7));
    nested.insert("genres".to_string(), json!([4, 8, 15]));
    let (_server, _fetcher, mut engine) =
        engine_with(vec![Ok(vec![nested]), Ok(Vec::new())]).await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("games.csv");

    let query = QuerySpec::new("games", vec!["id".to_string(), "genres".to_string()]);
    engine.extract(&query, &dest).await.unwrap();

    let contents = std::fs::read_to_string(&dest).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "id,genres");
    assert_eq!(lines[1], "7,4|8|15");
}

#[tokio::test]
async fn test_extract_accumulates_stats_across_tables() {
    let (_server, _fetcher, mut engine) = engine_with(vec![
        Ok(page(0..3)),
        Ok(Vec::new()),
        Ok(page(0..2)),
        Ok(Vec::new()),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();

    engine
        .extract(&games_query(), dir.path().join("a.csv"))
        .await
        .unwrap();
    engine
        .extract(&games_query(), dir.path().join("b.csv"))
        .await
        .unwrap();

    let stats = engine.stats();
    assert_eq!(stats.rows_written, 5);
    assert_eq!(stats.pages_fetched, 4);
    assert_eq!(stats.tables_exported, 2);

    engine.reset_stats();
    assert_eq!(engine.stats().rows_written, 0);
}
