//! Full pipeline: load, total, filter, aggregate, plan.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use trade_map_core::{
    aggregate_nodes, build_render_plan, filter_by_perspective, total_trade_per_pair, AppConfig,
    Perspective,
};
use trade_map_data::{PlanWriter, TableLoader};

/// Arguments for the plan command.
#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Trade data file (.feather, .arrow, .ipc, .parquet or .csv)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Render plan JSON output path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Keep only the top share of each country's edges, 0-100 (default: filter.quantile)
    #[arg(short, long)]
    pub quantile: Option<f64>,

    /// Partition side for the filter (default: filter.perspective)
    #[arg(short, long)]
    pub perspective: Option<Perspective>,

    /// Weight edges by the pair total in both directions instead of the directed value
    #[arg(long)]
    pub symmetric: bool,

    /// Also write the node table (.csv or .parquet)
    #[arg(long)]
    pub nodes_output: Option<PathBuf>,

    /// Also write the edge table (.csv or .parquet)
    #[arg(long)]
    pub edges_output: Option<PathBuf>,

    /// Figure title (default: render.title)
    #[arg(long)]
    pub title: Option<String>,

    /// Country code to centre the map on (default: render.center)
    #[arg(long)]
    pub center: Option<String>,
}

pub async fn run_plan(args: PlanArgs, config: &AppConfig) -> Result<()> {
    let columns = &config.columns;
    let mut render = config.render.clone();
    if let Some(title) = args.title {
        render.title = title;
    }
    if args.center.is_some() {
        render.center = args.center;
    }

    let table = TableLoader::load(&args.data, columns)?;

    // Nodes always size by the directed value summed per reporter.
    let mut cache = super::open_cache(config)?;
    let nodes = aggregate_nodes(&table, &columns.value, &columns.reporter, &mut cache).await?;

    let (edges, weight_column) = if args.symmetric {
        let totals = total_trade_per_pair(
            &table,
            &columns.value,
            &columns.reporter,
            &columns.partner,
            &columns.total,
        )?;
        (totals, columns.total.as_str())
    } else {
        (table, columns.value.as_str())
    };

    let edges = match args.quantile.or(config.filter.quantile) {
        Some(quantile) => {
            let perspective = args.perspective.unwrap_or(config.filter.perspective);
            let weighted = trade_map_core::ColumnNames {
                value: weight_column.to_string(),
                ..columns.clone()
            };
            filter_by_perspective(&edges, quantile, perspective, &weighted)?
        }
        None => edges,
    };

    let plan = build_render_plan(
        &nodes,
        &edges,
        weight_column,
        &columns.reporter,
        &columns.partner,
        &render,
    )?;
    PlanWriter::write_json(&args.output, &plan)?;

    if let Some(path) = args.nodes_output {
        super::write_nodes(&path, &nodes)?;
    }
    if let Some(path) = args.edges_output {
        super::write_edges(&path, &edges)?;
    }

    println!(
        "Plan: {} markers, {} segments ({} skipped), {} unresolved, {} failed lookups -> {}",
        plan.markers.len(),
        plan.segments.len(),
        plan.skipped_edges,
        nodes.unresolved().len(),
        nodes.failed().len(),
        args.output.display()
    );
    Ok(())
}
