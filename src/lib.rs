// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # IGDB CSV Exporter
//!
//! A bulk exporter that drains IGDB API tables into flat CSV files.
//!
//! ## Features
//!
//! - **OAuth2 App Tokens**: Twitch client-credentials exchange with in-process caching
//! - **Offset Pagination**: Drains whole tables page by page until exhausted
//! - **Rate-limit Friendly**: Fixed pacing between pages and simple 429 retry
//! - **Flat CSV Output**: Nested JSON values flattened into spreadsheet-friendly cells
//! - **YAML Jobs**: Declarative table lists with curated field selections
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use igdb_export::auth::TokenProvider;
//! use igdb_export::config::{ApiConfig, Credentials};
//! use igdb_export::engine::ExportEngine;
//! use igdb_export::fetch::HttpFetcher;
//! use igdb_export::query::QuerySpec;
//! use igdb_export::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let credentials = Credentials::from_env()?;
//!     let config = ApiConfig::default();
//!
//!     let tokens = TokenProvider::new(credentials.clone(), &config);
//!     let fetcher = HttpFetcher::new(credentials.client_id, &config);
//!     let mut engine = ExportEngine::new(fetcher, tokens);
//!
//!     let query = QuerySpec::new("games", vec!["id".into(), "name".into()]);
//!     let rows = engine.extract(&query, "games.csv").await?;
//!     println!("wrote {rows} rows");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Export Job                             │
//! │  load_job(yaml) → tables → QuerySpec per table                  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   Fetch   │    Engine     │  Flatten  │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ OAuth2   │ POST body │ Offset loop   │ Lists "|" │ CSV         │
//! │ Caching  │ 429 retry │ Row caps      │ Maps JSON │ Lazy file   │
//! │          │ Timeouts  │ Pacing        │ Scalars   │ Header once │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the exporter
pub mod error;

/// Common types and type aliases
pub mod types;

/// Credentials and API configuration
pub mod config;

/// Table query descriptions
pub mod query;

/// Record flattening for CSV cells
pub mod flatten;

/// OAuth2 token acquisition
pub mod auth;

/// Page fetching over HTTP
pub mod fetch;

/// CSV output
pub mod output;

/// Pagination engine
pub mod engine;

/// Export job definitions
pub mod job;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use job::{load_job, load_job_from_str, JobDefinition};
pub use query::QuerySpec;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
