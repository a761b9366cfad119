//! Route command handler.

use super::{print_json, read_question};
use clap::Args;
use copilot_core::{config::AppConfig, AppResult};
use copilot_engine::{rule_based, Copilot};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Show how a question would be routed and which evidence it gathers
#[derive(Args, Debug)]
pub struct RouteCommand {
    /// The question to route
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "question")]
    pub file: Option<PathBuf>,

    /// Output intent and evidence as JSON
    #[arg(long)]
    pub json: bool,
}

impl RouteCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing route command");

        let question = read_question(self.question.as_deref(), self.file.as_ref())?;
        if rule_based(&question).is_none() {
            tracing::info!("Rules inconclusive, the classifier will be consulted");
        }

        let copilot = Copilot::from_config(config, CancellationToken::new()).await?;
        let gathered = copilot.gather(&question).await;

        if self.json {
            return print_json(&gathered);
        }

        println!("Intent: {}", gathered.intent);
        if let Some(sql) = &gathered.sql {
            match sql.limit {
                Some(limit) => println!("Template: {:?} (limit {})", sql.kind, limit),
                None => println!("Template: {:?}", sql.kind),
            }
            println!("Query: {}", sql.query);
        }
        println!("\n{}", gathered.evidence.text());
        Ok(())
    }
}
