//! Retention Copilot CLI
//!
//! Main entry point for the `copilot` command-line tool.
//! Answers subscriber and retention-strategy questions from grounded evidence.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, RouteCommand, SearchCommand, SeedCommand};
use copilot_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Retention Copilot - grounded answers over subscriber data and strategy notes
#[derive(Parser, Debug)]
#[command(name = "copilot")]
#[command(about = "Grounded answers over subscriber data and strategy notes", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "COPILOT_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "COPILOT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Generation provider (gemini, ollama)
    #[arg(short, long, global = true, env = "COPILOT_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "COPILOT_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question and get a grounded answer
    Ask(AskCommand),

    /// Show the routing decision and gathered evidence
    Route(RouteCommand),

    /// Search the knowledge corpus
    Search(SearchCommand),

    /// Create the synthetic subscriber database
    Seed(SeedCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Ask(_) => "ask",
            Commands::Route(_) => "route",
            Commands::Search(_) => "search",
            Commands::Seed(_) => "seed",
        }
    }

    /// Commands that build the pipeline and talk to the generation provider
    fn needs_provider(&self) -> bool {
        matches!(self, Commands::Ask(_) | Commands::Route(_))
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let config = AppConfig::load()?.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Retention Copilot starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    // Search and seed work offline, so only pipeline commands need credentials
    if cli.command.needs_provider() {
        config.validate()?;
    }

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Route(cmd) => cmd.execute(&config).await,
        Commands::Search(cmd) => cmd.execute(&config).await,
        Commands::Seed(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
