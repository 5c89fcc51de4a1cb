//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// IGDB CSV exporter CLI
#[derive(Parser, Debug)]
#[command(name = "igdb-export")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Job name or YAML file path
    #[arg(short, long, global = true, default_value = "igdb")]
    pub job: String,

    /// Twitch client id (falls back to TWITCH_CLIENT_ID)
    #[arg(long, global = true)]
    pub client_id: Option<String>,

    /// Twitch client secret (falls back to TWITCH_CLIENT_SECRET)
    #[arg(long, global = true)]
    pub client_secret: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export tables to CSV files
    Export {
        /// Tables to export (comma-separated, empty = all)
        #[arg(long)]
        tables: Option<String>,

        /// Output directory (overrides the job's output_dir)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Row cap applied to every exported table
        #[arg(long)]
        max_rows: Option<u64>,
    },

    /// Test credentials against the token endpoint
    Check,

    /// List the tables of a job
    Tables,

    /// Validate a job definition
    Validate,
}
