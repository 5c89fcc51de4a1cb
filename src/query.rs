//! Table query description
//!
//! A [`QuerySpec`] names one API table and the query that drains it. The
//! wire format is the API's textual query language: semicolon-terminated
//! clauses in a fixed order, with `limit`/`offset` appended by the
//! pagination loop.

use crate::error::{Error, Result};

/// Largest page size the server accepts
pub const MAX_PAGE_SIZE: u32 = 500;

/// Default sort expression
pub const DEFAULT_SORT: &str = "id asc";

/// One table's query: endpoint, field list, optional filter, sort order
/// and paging parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    /// Endpoint name appended to the API base URL (e.g. `games`)
    pub endpoint: String,
    /// Fields to request; `*` requests everything
    pub fields: Vec<String>,
    /// Optional filter expression for a `where` clause
    pub filter: Option<String>,
    /// Sort expression
    pub sort: String,
    /// Rows per page, 1..=[`MAX_PAGE_SIZE`]
    pub page_size: u32,
    /// Soft ceiling on total rows; the batch that crosses it still lands
    pub row_cap: Option<u64>,
}

impl QuerySpec {
    /// Create a query for an endpoint with the given fields
    pub fn new(endpoint: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            fields,
            filter: None,
            sort: DEFAULT_SORT.to_string(),
            page_size: MAX_PAGE_SIZE,
            row_cap: None,
        }
    }

    /// Set a filter expression
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set the sort expression
    #[must_use]
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }

    /// Set the page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the soft row cap
    #[must_use]
    pub fn with_row_cap(mut self, cap: u64) -> Self {
        self.row_cap = Some(cap);
        self
    }

    /// Check the query before any network traffic
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(Error::missing_field("endpoint"));
        }
        if self.fields.is_empty() || self.fields.iter().any(String::is_empty) {
            return Err(Error::invalid_value(
                "fields",
                "at least one non-empty field is required",
            ));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::invalid_value(
                "page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        if self.sort.is_empty() {
            return Err(Error::invalid_value("sort", "sort expression is empty"));
        }
        if self.row_cap == Some(0) {
            return Err(Error::invalid_value("row_cap", "must be at least 1"));
        }
        Ok(())
    }

    /// True when the field list requests everything
    pub fn is_wildcard(&self) -> bool {
        self.fields.iter().any(|f| f == "*")
    }

    /// Columns implied by the field list, or None under a wildcard
    ///
    /// Dotted expansion paths collapse to their root key, which is the key
    /// the response actually carries (`platforms.name` comes back under
    /// `platforms`). Duplicates after collapsing are dropped.
    pub fn header_columns(&self) -> Option<Vec<String>> {
        if self.is_wildcard() {
            return None;
        }
        let mut columns: Vec<String> = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let root = field.split('.').next().unwrap_or(field).to_string();
            if !columns.contains(&root) {
                columns.push(root);
            }
        }
        Some(columns)
    }

    /// Render the query body for one page at the given offset
    pub fn body(&self, offset: u64) -> String {
        let mut q = format!("fields {};", self.fields.join(","));
        if let Some(ref filter) = self.filter {
            q.push_str(&format!(" where {filter};"));
        }
        q.push_str(&format!(
            " sort {}; limit {}; offset {};",
            self.sort, self.page_size, offset
        ));
        q
    }
}
