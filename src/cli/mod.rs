//! CLI module
//!
//! Command-line interface for running export jobs.
//!
//! # Commands
//!
//! - `export` - Export tables to CSV files
//! - `check` - Test credentials against the token endpoint
//! - `tables` - List the tables of a job
//! - `validate` - Validate a job definition

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
