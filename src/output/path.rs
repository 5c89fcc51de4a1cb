//! Output path construction

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Default filename for a table exported at `now`
///
/// The minute-resolution timestamp keeps repeated exports of the same
/// table from clobbering each other.
pub fn timestamped_filename(table: &str, now: DateTime<Utc>) -> String {
    format!("{}_{}.csv", table, now.format("%Y%m%d_%H%M"))
}

/// Resolve the destination path for one table
///
/// An explicit filename wins; otherwise the timestamped default is used.
pub fn resolve_output_path(
    output_dir: impl AsRef<Path>,
    table: &str,
    filename: Option<&str>,
    now: DateTime<Utc>,
) -> PathBuf {
    let filename = match filename {
        Some(name) => name.to_string(),
        None => timestamped_filename(table, now),
    };
    output_dir.as_ref().join(filename)
}
