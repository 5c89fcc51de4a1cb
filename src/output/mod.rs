//! Output module
//!
//! Incremental CSV writing and output path construction.
//!
//! # Overview
//!
//! This module provides:
//! - [`CsvWriter`]: appends flattened batches to one CSV file, creating
//!   the file and header lazily on the first batch
//! - timestamped output filenames in the `{table}_{YYYYmmdd_HHMM}.csv`
//!   form

mod path;
mod writer;

pub use path::{resolve_output_path, timestamped_filename};
pub use writer::CsvWriter;
