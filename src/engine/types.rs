//! Engine types

/// Statistics accumulated across extraction runs
#[derive(Debug, Clone, Default)]
pub struct ExportStats {
    /// Total rows written
    pub rows_written: u64,
    /// Total pages fetched, including the final empty probe
    pub pages_fetched: u64,
    /// Tables exported
    pub tables_exported: u64,
    /// Duration of the most recent run in milliseconds
    pub duration_ms: u64,
}

impl ExportStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add rows
    pub fn add_rows(&mut self, count: u64) {
        self.rows_written += count;
    }

    /// Add a page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Add a table
    pub fn add_table(&mut self) {
        self.tables_exported += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
