use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commercial;
mod parking;

#[derive(Debug, Parser)]
#[command(name = "citypulse")]
#[command(about = "Seoul facility-state harvesting pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Harvest the city parking dataset into the search index.
    Parking {
        /// Report what would be indexed without contacting the index.
        #[arg(long)]
        dry_run: bool,
    },
    /// Summarise commercial-area activity against the indexed parking
    /// snapshot.
    Commercial {
        /// Report what would be indexed without contacting the index.
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = citypulse_core::load_app_config()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Parking { dry_run } => parking::run(&config, dry_run).await,
        Commands::Commercial { dry_run } => commercial::run(&config, dry_run).await,
    }
}
