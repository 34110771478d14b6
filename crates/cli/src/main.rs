//! studyclaw CLI — the main entry point.
//!
//! Commands:
//! - `chat`   — Interactive chat or single-message mode
//! - `status` — Show configuration, memory, and study-goal state

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "studyclaw",
    about = "studyclaw — a personal study-coach agent for the terminal",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the study coach
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Show configuration, memory, and study-goal state
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up MISTRAL_API_KEY and friends from a local .env, if present.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Chat { message } => commands::chat::run(message).await,
        Commands::Status => commands::status::run().await,
    }
}
