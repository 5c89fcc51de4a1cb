//! CLI runner - executes commands

use crate::auth::TokenProvider;
use crate::cli::commands::{Cli, Commands};
use crate::config::{ApiConfig, Credentials};
use crate::engine::ExportEngine;
use crate::error::{Error, Result};
use crate::fetch::HttpFetcher;
use crate::job::{load_job, JobDefinition};
use crate::output::resolve_output_path;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Export {
                tables,
                output_dir,
                max_rows,
            } => {
                self.export(tables.as_deref(), output_dir.as_deref(), *max_rows)
                    .await
            }
            Commands::Check => self.check().await,
            Commands::Tables => self.tables(),
            Commands::Validate => self.validate(),
        }
    }

    /// Load the job definition
    fn load_job(&self) -> Result<JobDefinition> {
        load_job(&self.cli.job)
    }

    /// Resolve credentials from flags or the environment
    fn credentials(&self) -> Result<Credentials> {
        Credentials::resolve(self.cli.client_id.clone(), self.cli.client_secret.clone())
    }

    /// Export tables to CSV files
    async fn export(
        &self,
        tables: Option<&str>,
        output_dir: Option<&Path>,
        max_rows: Option<u64>,
    ) -> Result<()> {
        let start = Instant::now();
        let job = self.load_job()?;
        let credentials = self.credentials()?;
        let config = ApiConfig::default();

        // Parse the table filter and reject names the job does not have
        let filter: Option<Vec<&str>> = tables.map(|s| s.split(',').collect());
        if let Some(ref names) = filter {
            for name in names {
                if !job.tables.iter().any(|t| t.name == *name) {
                    return Err(Error::config(format!(
                        "Job '{}' has no table named '{}'",
                        job.name, name
                    )));
                }
            }
        }

        let output_dir: PathBuf = output_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(&job.output_dir));

        let tokens = TokenProvider::new(credentials.clone(), &config);
        let fetcher = HttpFetcher::new(credentials.client_id, &config);
        let mut engine = ExportEngine::new(fetcher, tokens).with_page_delay(config.page_delay);

        // One timestamp for the whole run so filenames line up
        let now = Utc::now();
        info!("Running job '{}' into {}", job.name, output_dir.display());

        for table in &job.tables {
            if let Some(ref names) = filter {
                if !names.contains(&table.name.as_str()) {
                    continue;
                }
            }

            let mut query = table.to_query();
            if let Some(cap) = max_rows {
                query = query.with_row_cap(cap);
            }

            let destination =
                resolve_output_path(&output_dir, &table.name, table.filename.as_deref(), now);
            let rows = engine.extract(&query, &destination).await?;
            println!(
                "[{}] wrote {} rows to {}",
                table.name,
                rows,
                destination.display()
            );
        }

        let stats = engine.stats();
        println!(
            "Done: {} tables, {} rows in {}ms",
            stats.tables_exported,
            stats.rows_written,
            start.elapsed().as_millis()
        );

        Ok(())
    }

    /// Test credentials against the token endpoint
    async fn check(&self) -> Result<()> {
        let credentials = self.credentials()?;
        let config = ApiConfig::default();
        let tokens = TokenProvider::new(credentials, &config);

        match tokens.acquire().await {
            Ok(_) => {
                println!("Authentication succeeded");
                Ok(())
            }
            Err(e) => {
                println!("Authentication failed: {e}");
                Err(e)
            }
        }
    }

    /// List the tables of a job
    fn tables(&self) -> Result<()> {
        let job = self.load_job()?;

        for table in &job.tables {
            let fields = if table.to_query().is_wildcard() {
                "all fields".to_string()
            } else {
                format!("{} fields", table.fields.len())
            };
            let cap = table
                .row_cap
                .map(|c| format!(", cap {c}"))
                .unwrap_or_default();
            println!("{} ({fields}{cap})", table.name);
        }

        Ok(())
    }

    /// Validate a job definition
    fn validate(&self) -> Result<()> {
        let job = self.load_job()?;

        println!(
            "Job '{}' is valid with {} tables",
            job.name,
            job.tables.len()
        );

        Ok(())
    }
}
