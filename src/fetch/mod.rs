//! Page fetching
//!
//! The network boundary of the exporter. One POST per page; the
//! rate-limit retry loop lives inside the fetcher so callers only ever
//! see a page of records or a fatal error.
//!
//! The [`PageFetcher`] trait keeps the pagination engine testable
//! against doubles instead of a live server.

mod client;

pub use client::HttpFetcher;

use crate::auth::AppToken;
use crate::error::Result;
use crate::query::QuerySpec;
use crate::types::Record;
use async_trait::async_trait;

/// Fetches one page of records at a time
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page of `query` starting at `offset`
    ///
    /// An empty vector means the table is drained. Rate limiting is
    /// absorbed internally; any error returned here is fatal.
    async fn fetch_page(
        &self,
        query: &QuerySpec,
        offset: u64,
        token: &AppToken,
    ) -> Result<Vec<Record>>;
}
