//! Export job definitions
//!
//! Parses and validates export job YAML files. A job names the tables to
//! drain and the directory their CSV files land in. The `igdb` job is
//! embedded in the binary so `--job igdb` works without a file path.

use crate::error::{Error, Result};
use crate::query::{QuerySpec, DEFAULT_SORT, MAX_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Name of the built-in job
pub const BUILTIN_JOB: &str = "igdb";

/// Built-in job YAML embedded in the binary
static BUILTIN_JOB_YAML: &str = include_str!("../jobs/igdb.yaml");

// ============================================================================
// Job Definition
// ============================================================================

/// Top-level export job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JobDefinition {
    /// Job name
    pub name: String,
    /// Directory the CSV files are written into
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Table definitions
    pub tables: Vec<TableDefinition>,
}

fn default_output_dir() -> String {
    "igdb_csv".to_string()
}

/// One table to export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TableDefinition {
    /// Table name; doubles as the endpoint unless overridden
    pub name: String,
    /// Endpoint override
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Fields to request; `*` requests everything
    pub fields: Vec<String>,
    /// Optional filter expression
    #[serde(default, rename = "where")]
    pub filter: Option<String>,
    /// Sort expression
    #[serde(default = "default_sort")]
    pub sort: String,
    /// Rows per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Soft row cap
    #[serde(default)]
    pub row_cap: Option<u64>,
    /// Output filename override; a timestamped name is used when absent
    #[serde(default)]
    pub filename: Option<String>,
}

fn default_sort() -> String {
    DEFAULT_SORT.to_string()
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

impl TableDefinition {
    /// Endpoint this table drains
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(&self.name)
    }

    /// Build the query for this table
    pub fn to_query(&self) -> QuerySpec {
        let mut query = QuerySpec::new(self.endpoint(), self.fields.clone())
            .with_sort(self.sort.clone())
            .with_page_size(self.page_size);
        if let Some(ref filter) = self.filter {
            query = query.with_filter(filter.clone());
        }
        if let Some(cap) = self.row_cap {
            query = query.with_row_cap(cap);
        }
        query
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load a job definition from a name or file path
///
/// The input is first checked against the built-in job names (e.g.
/// `igdb`), then treated as a file path.
pub fn load_job(path: impl AsRef<Path>) -> Result<JobDefinition> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();

    // Built-in job names carry no path separators or extension
    if !path_str.contains('/')
        && !path_str.contains('\\')
        && !path_str.ends_with(".yaml")
        && !path_str.ends_with(".yml")
    {
        if let Some(yaml) = builtin_job(&path_str) {
            return load_job_from_str(yaml);
        }
    }

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::config(format!(
                "Job '{}' not found. Built-in jobs: {}. Or provide a path to a YAML file.",
                path.display(),
                BUILTIN_JOB
            ))
        } else {
            Error::config(format!(
                "Failed to read job file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_job_from_str(&content)
}

/// Load a job definition from a YAML string
pub fn load_job_from_str(yaml: &str) -> Result<JobDefinition> {
    let def: JobDefinition = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse job YAML: {e}")))?;

    validate_job(&def)?;
    Ok(def)
}

/// Get a built-in job by name
pub fn builtin_job(name: &str) -> Option<&'static str> {
    (name == BUILTIN_JOB).then_some(BUILTIN_JOB_YAML)
}

/// Validate a job definition
fn validate_job(def: &JobDefinition) -> Result<()> {
    if def.name.is_empty() {
        return Err(Error::config("Job name cannot be empty"));
    }

    if def.output_dir.is_empty() {
        return Err(Error::config("Job output_dir cannot be empty"));
    }

    if def.tables.is_empty() {
        return Err(Error::config("Job must have at least one table"));
    }

    let table_names: HashSet<_> = def.tables.iter().map(|t| &t.name).collect();
    if table_names.len() != def.tables.len() {
        return Err(Error::config("Duplicate table names found"));
    }

    for table in &def.tables {
        if table.name.is_empty() {
            return Err(Error::config("Table name cannot be empty"));
        }
        table
            .to_query()
            .validate()
            .map_err(|e| Error::config(format!("Table '{}' is invalid: {e}", table.name)))?;
    }

    Ok(())
}
