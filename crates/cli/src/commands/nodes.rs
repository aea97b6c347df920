//! Node aggregation command.
//!
//! Sums trade value per country and geocodes each country through the cache.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use trade_map_core::{aggregate_nodes, AppConfig};
use trade_map_data::TableLoader;

/// Arguments for the nodes command.
#[derive(Args, Debug, Clone)]
pub struct NodesArgs {
    /// Trade data file (.feather, .arrow, .ipc, .parquet or .csv)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Column to group by (default: configured reporter column)
    #[arg(long)]
    pub group: Option<String>,

    /// Column to sum (default: configured value column)
    #[arg(long)]
    pub value: Option<String>,

    /// Output file for the node table (.csv or .parquet)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn run_nodes(args: NodesArgs, config: &AppConfig) -> Result<()> {
    let table = TableLoader::load(&args.data, &config.columns)?;
    let group = args.group.unwrap_or_else(|| config.columns.reporter.clone());
    let value = args.value.unwrap_or_else(|| config.columns.value.clone());

    let mut cache = super::open_cache(config)?;
    let nodes = aggregate_nodes(&table, &value, &group, &mut cache).await?;

    println!("{:<8} {:>18} {:>10} {:>10}", "iso", value, "lat", "long");
    for node in nodes.iter() {
        let lat = node.lat().map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".to_string());
        let lon = node.lon().map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:>18.2} {:>10} {:>10}",
            node.iso, node.aggregate_value, lat, lon
        );
    }

    let stats = cache.stats();
    tracing::info!(
        hits = stats.hits,
        misses = stats.misses,
        failures = stats.failures,
        "Geocode cache"
    );

    if let Some(output) = args.output {
        super::write_nodes(&output, &nodes)?;
        tracing::info!(path = %output.display(), "Wrote node table");
    }

    Ok(())
}
