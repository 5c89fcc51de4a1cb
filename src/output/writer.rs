//! Incremental CSV writer
//!
//! Appends one flattened batch at a time to a CSV file. The file and its
//! header row are created on the first non-empty batch, so a table that
//! yields no rows leaves nothing on disk. Each append ends with a flush;
//! whatever reached the file stays there even if the run aborts later.

use crate::error::{Error, Result};
use crate::types::FlatRow;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Buffer size for file writes
const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// CSV file writer with a fixed header
pub struct CsvWriter {
    /// Destination path
    path: PathBuf,
    /// Column order; None until derived from the first batch
    header: Option<Vec<String>>,
    /// Underlying writer, created on the first non-empty batch
    inner: Option<csv::Writer<BufWriter<File>>>,
    /// Number of data rows written
    rows_written: u64,
    /// Row keys outside the header that were already warned about
    unknown_columns: BTreeSet<String>,
}

impl CsvWriter {
    /// Create a writer
    ///
    /// With `Some(columns)` the header is pre-declared and every row is
    /// aligned to it. With `None` the header is derived from the first
    /// batch: the sorted union of its keys.
    pub fn new(path: impl Into<PathBuf>, header: Option<Vec<String>>) -> Self {
        Self {
            path: path.into(),
            header,
            inner: None,
            rows_written: 0,
            unknown_columns: BTreeSet::new(),
        }
    }

    /// Destination path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of data rows written so far
    #[must_use]
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Append a batch of rows, creating the file on first use
    ///
    /// Rows are aligned to the header: missing columns become empty
    /// cells and keys outside the header are dropped with a warning,
    /// once per column name.
    pub fn append(&mut self, rows: &[FlatRow]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        if self.inner.is_none() {
            self.open(rows)?;
        }

        // Both are set once open() has run
        let header = self
            .header
            .as_ref()
            .ok_or_else(|| Error::output("header not set"))?;
        let writer = self
            .inner
            .as_mut()
            .ok_or_else(|| Error::output("writer not open"))?;

        for row in rows {
            for key in row.keys() {
                if !header.iter().any(|col| col == key)
                    && self.unknown_columns.insert(key.clone())
                {
                    warn!(
                        "Column '{}' is not in the header of {} and will be dropped",
                        key,
                        self.path.display()
                    );
                }
            }

            let record = header
                .iter()
                .map(|col| row.get(col).map_or("", String::as_str));
            writer.write_record(record)?;
        }

        writer.flush()?;
        self.rows_written += rows.len() as u64;
        Ok(())
    }

    /// Flush and finalize the file, returning the number of rows written
    ///
    /// If no batch was ever appended there is no file to finalize.
    pub fn close(mut self) -> Result<u64> {
        if let Some(writer) = self.inner.take() {
            let buf = writer
                .into_inner()
                .map_err(|e| Error::output(format!("Failed to finalize CSV file: {e}")))?;
            let file = buf
                .into_inner()
                .map_err(|e| Error::output(format!("Failed to flush CSV file: {e}")))?;
            file.sync_all()?;
            debug!(
                "Closed {} with {} rows",
                self.path.display(),
                self.rows_written
            );
        }
        Ok(self.rows_written)
    }

    fn open(&mut self, first_batch: &[FlatRow]) -> Result<()> {
        let header = self
            .header
            .get_or_insert_with(|| derive_header(first_batch));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&self.path)?;
        let mut writer =
            csv::Writer::from_writer(BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file));
        writer.write_record(&*header)?;

        debug!(
            "Created {} with {} columns",
            self.path.display(),
            header.len()
        );
        self.inner = Some(writer);
        Ok(())
    }
}

/// Sorted union of the keys across a batch
fn derive_header(rows: &[FlatRow]) -> Vec<String> {
    let mut columns = BTreeSet::new();
    for row in rows {
        for key in row.keys() {
            columns.insert(key.clone());
        }
    }
    columns.into_iter().collect()
}
