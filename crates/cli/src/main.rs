use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{FilterArgs, GeocodeArgs, NodesArgs, PlanArgs, TotalTradeArgs};
use trade_map_core::ConfigLoader;

#[derive(Parser)]
#[command(name = "trade-map")]
#[command(about = "Bilateral trade networks on a world map", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = "config/Config.toml")]
    config: PathBuf,

    /// Config profile layered over the config file (config/Config.<profile>.toml)
    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sum trade value per country and geocode each country
    Nodes(NodesArgs),
    /// Keep the top share of each country's trade edges
    Filter(FilterArgs),
    /// Add the total trade of each pair in both directions
    TotalTrade(TotalTradeArgs),
    /// Resolve country codes through the geocode cache
    Geocode(GeocodeArgs),
    /// Run the full pipeline and write a render plan
    Plan(PlanArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.profile {
        Some(profile) => ConfigLoader::load_with_profile(&cli.config, profile)?,
        None => ConfigLoader::load_from(&cli.config)?,
    };

    match cli.command {
        Commands::Nodes(args) => commands::run_nodes(args, &config).await?,
        Commands::Filter(args) => commands::run_filter(args, &config)?,
        Commands::TotalTrade(args) => commands::run_total_trade(args, &config)?,
        Commands::Geocode(args) => commands::run_geocode(args, &config).await?,
        Commands::Plan(args) => commands::run_plan(args, &config).await?,
    }

    Ok(())
}
