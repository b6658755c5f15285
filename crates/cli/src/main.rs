mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sediment")]
#[command(about = "Batch-oriented database schema migrations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new migration file
    #[command(name = "make:migration")]
    MakeMigration {
        /// Migration name, normalized to snake_case
        name: String,
    },

    /// Apply all pending migrations
    Migrate,

    /// Roll back the most recent batch of migrations
    #[command(name = "migrate:rollback")]
    Rollback,

    /// Show applied/pending state for every migration
    #[command(name = "migrate:status")]
    Status,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::MakeMigration { name } => commands::make_migration(&name),
        Commands::Migrate => commands::migrate().await,
        Commands::Rollback => commands::rollback().await,
        Commands::Status => commands::status().await,
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
