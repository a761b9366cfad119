//! Ask command handler.
//!
//! Routes the question, gathers one kind of evidence and prints the grounded
//! answer.

use super::{print_json, read_question};
use clap::Args;
use copilot_core::{config::AppConfig, AppResult};
use copilot_engine::Copilot;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Ask a question about subscribers or retention strategy
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "question")]
    pub file: Option<PathBuf>,

    /// Print the gathered evidence before the answer
    #[arg(long)]
    pub show_evidence: bool,

    /// Output the full answer record as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = read_question(self.question.as_deref(), self.file.as_ref())?;

        let copilot = Copilot::from_config(config, cancel_on_ctrl_c()).await?;
        let answer = copilot.answer(&question).await?;

        if self.json {
            return print_json(&answer);
        }

        println!("Intent: {}", answer.intent.as_str().to_uppercase());
        if let Some(query) = &answer.sql_query {
            println!("Query: {}", query);
        }

        if self.show_evidence {
            println!("\n--- Evidence ({}) ---", answer.evidence.kind());
            println!("{}", answer.evidence.text());
            println!("--- End evidence ---");
        }

        println!("\n{}", answer.answer);
        Ok(())
    }
}

/// Token cancelled on Ctrl-C, so a long rate-limit backoff can be abandoned.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let watcher = token.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling pending generation");
            watcher.cancel();
        }
    });

    token
}
