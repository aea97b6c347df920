//! Symmetric pair total command.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use trade_map_core::{total_trade_per_pair, AppConfig};
use trade_map_data::TableLoader;

/// Arguments for the total-trade command.
#[derive(Args, Debug, Clone)]
pub struct TotalTradeArgs {
    /// Trade data file (.feather, .arrow, .ipc, .parquet or .csv)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Column receiving the pair totals (default: columns.total)
    #[arg(long)]
    pub output_column: Option<String>,

    /// Output file (.csv or .parquet)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Rows to print
    #[arg(long, default_value = "20")]
    pub limit: usize,
}

pub fn run_total_trade(args: TotalTradeArgs, config: &AppConfig) -> Result<()> {
    let columns = &config.columns;
    let output_column = args.output_column.unwrap_or_else(|| columns.total.clone());

    let table = TableLoader::load(&args.data, columns)?;
    let totals = total_trade_per_pair(
        &table,
        &columns.value,
        &columns.reporter,
        &columns.partner,
        &output_column,
    )?;

    super::print_edges(&totals, args.limit);

    if let Some(output) = args.output {
        super::write_edges(&output, &totals)?;
        tracing::info!(path = %output.display(), rows = totals.len(), "Wrote pair totals");
    }

    Ok(())
}
