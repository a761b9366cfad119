//! Seed command handler.

use clap::Args;
use copilot_core::{config::AppConfig, AppResult};
use copilot_sql::{seed_database, DEFAULT_SEED};
use std::path::PathBuf;

/// Create the synthetic subscriber database
#[derive(Args, Debug)]
pub struct SeedCommand {
    /// Random seed; the same seed always produces the same rows
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Write to this path instead of the configured database
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl SeedCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing seed command");

        let path = self
            .output
            .clone()
            .unwrap_or_else(|| config.database_file());

        let report = seed_database(&path, self.seed)?;
        println!(
            "Database seeded: {} rows written to {}",
            report.rows,
            report.path.display()
        );
        Ok(())
    }
}
