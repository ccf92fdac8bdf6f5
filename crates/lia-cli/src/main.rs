mod export;
mod filter;
mod scrape;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::export::ExportArgs;
use crate::filter::FilterArgs;
use crate::scrape::ScrapeArgs;

#[derive(Debug, Parser)]
#[command(name = "lia")]
#[command(about = "Scrape and filter recent LinkedIn activity")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape the latest posts of each listed profile into the aggregate file
    Scrape(ScrapeArgs),
    /// Keep only recent, on-topic posts from an aggregate file
    Filter(FilterArgs),
    /// Write a filtered document as a one-row-per-profile CSV table
    Export(ExportArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = lia_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Scrape(args) => scrape::run(&config, args).await,
        Commands::Filter(args) => filter::run(&config, args).await,
        Commands::Export(args) => export::run(&config, &args),
    }
}
