//! CLI commands for the trade map pipeline.

pub mod filter;
pub mod geocode;
pub mod nodes;
pub mod plan;
pub mod total_trade;

pub use filter::{run_filter, FilterArgs};
pub use geocode::{run_geocode, GeocodeArgs};
pub use nodes::{run_nodes, NodesArgs};
pub use plan::{run_plan, PlanArgs};
pub use total_trade::{run_total_trade, TotalTradeArgs};

use anyhow::{bail, Context, Result};
use std::path::Path;
use trade_map_core::{AppConfig, NodeTable, TradeTable};
use trade_map_data::{CsvStorage, ParquetStorage};
use trade_map_geocode::{GeoCache, JsonFileStore, NominatimClient};

/// Cache over the configured Nominatim endpoint and cache file.
pub type DefaultGeoCache = GeoCache<NominatimClient, JsonFileStore>;

/// Opens the geocode cache described by the configuration.
pub fn open_cache(config: &AppConfig) -> Result<DefaultGeoCache> {
    let client = NominatimClient::new(&config.geocoder).context("Failed to build geocoder")?;
    let store = JsonFileStore::new(config.cache.path.clone());
    let cache = GeoCache::open(client, store)
        .with_context(|| format!("Failed to open cache {}", config.cache.path.display()))?
        .with_query_mode(config.geocoder.query_mode);
    Ok(cache)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Writes an edge table as CSV or Parquet, by extension.
pub fn write_edges(path: &Path, edges: &TradeTable) -> Result<()> {
    match extension(path).as_deref() {
        Some("csv") => CsvStorage::write_edges(path, edges),
        Some("parquet") => ParquetStorage::write_edges(path, edges),
        _ => bail!("Unsupported output file: {} (use .csv or .parquet)", path.display()),
    }
}

/// Writes a node table as CSV or Parquet, by extension.
pub fn write_nodes(path: &Path, nodes: &NodeTable) -> Result<()> {
    match extension(path).as_deref() {
        Some("csv") => CsvStorage::write_nodes(path, nodes),
        Some("parquet") => ParquetStorage::write_nodes(path, nodes),
        _ => bail!("Unsupported output file: {} (use .csv or .parquet)", path.display()),
    }
}

/// Prints up to `limit` edge rows as an aligned table.
pub fn print_edges(edges: &TradeTable, limit: usize) {
    let text: Vec<(&str, &[String])> = edges.text_columns().collect();
    let numeric: Vec<(&str, &[f64])> = edges.numeric_columns().collect();

    let header: Vec<String> = text
        .iter()
        .map(|(name, _)| format!("{name:<12}"))
        .chain(numeric.iter().map(|(name, _)| format!("{name:>16}")))
        .collect();
    println!("{}", header.join(" "));

    for row in 0..edges.len().min(limit) {
        let cells: Vec<String> = text
            .iter()
            .map(|(_, values)| format!("{:<12}", values[row]))
            .chain(numeric.iter().map(|(_, values)| format!("{:>16.2}", values[row])))
            .collect();
        println!("{}", cells.join(" "));
    }
    if edges.len() > limit {
        println!("... {} more rows", edges.len() - limit);
    }
}
