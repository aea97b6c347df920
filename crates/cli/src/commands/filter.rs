//! Percentile edge filter command.

use anyhow::{anyhow, Result};
use clap::Args;
use std::path::PathBuf;
use trade_map_core::{filter_by_perspective, AppConfig, Perspective};
use trade_map_data::TableLoader;

/// Arguments for the filter command.
#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Trade data file (.feather, .arrow, .ipc, .parquet or .csv)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Top share of each country's edges to keep, 0-100 (default: filter.quantile)
    #[arg(short, long)]
    pub quantile: Option<f64>,

    /// Partition side: reporter, partner or both (default: filter.perspective)
    #[arg(short, long)]
    pub perspective: Option<Perspective>,

    /// Output file for the kept edges (.csv or .parquet)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Rows to print
    #[arg(long, default_value = "20")]
    pub limit: usize,
}

pub fn run_filter(args: FilterArgs, config: &AppConfig) -> Result<()> {
    let quantile = args
        .quantile
        .or(config.filter.quantile)
        .ok_or_else(|| anyhow!("No quantile given (use --quantile or filter.quantile)"))?;
    let perspective = args.perspective.unwrap_or(config.filter.perspective);

    let table = TableLoader::load(&args.data, &config.columns)?;
    let kept = filter_by_perspective(&table, quantile, perspective, &config.columns)?;

    println!(
        "Kept {} of {} edges (top {}% per {}).",
        kept.len(),
        table.len(),
        quantile,
        perspective.as_str()
    );
    super::print_edges(&kept, args.limit);

    if let Some(output) = args.output {
        super::write_edges(&output, &kept)?;
        tracing::info!(path = %output.display(), rows = kept.len(), "Wrote filtered edges");
    }

    Ok(())
}
