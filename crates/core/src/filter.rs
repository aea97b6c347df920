//! Per-country percentile filtering of trade edges.
//!
//! Each country's edges are judged against a cutoff computed over that
//! country's own edges, so small traders keep their largest routes too.

use crate::error::{Result, TradeMapError};
use crate::table::{partition_indices, ColumnNames, TradeTable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Which side of a trade record defines the partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perspective {
    /// Partition by reporter code.
    #[default]
    Reporter,
    /// Partition by partner code.
    Partner,
    /// Union of the reporter and partner results, deduplicated by pair.
    Both,
}

impl Perspective {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reporter => "reporter",
            Self::Partner => "partner",
            Self::Both => "both",
        }
    }
}

impl std::str::FromStr for Perspective {
    type Err = TradeMapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "reporter" => Ok(Self::Reporter),
            "partner" => Ok(Self::Partner),
            "both" => Ok(Self::Both),
            other => Err(TradeMapError::invalid_argument(format!(
                "unknown perspective: {other} (expected reporter, partner or both)"
            ))),
        }
    }
}

/// Computes the `p`-th percentile (0..=100) of `values` with linear interpolation.
///
/// NaN values are skipped. Returns `None` when no finite comparison is possible
/// (empty input or all NaN).
#[must_use]
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

fn validate_quantile(quantile: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&quantile) {
        return Err(TradeMapError::invalid_argument(format!(
            "quantile must be within [0, 100], got {quantile}"
        )));
    }
    Ok(())
}

/// Row indices kept by the percentile filter, partition by partition.
fn retained_indices(
    table: &TradeTable,
    quantile: f64,
    value_column: &str,
    partition_column: &str,
) -> Result<Vec<usize>> {
    validate_quantile(quantile)?;
    let values = table.numeric(value_column)?;
    let keys = table.text(partition_column)?;

    let mut kept = Vec::new();
    for (key, rows) in partition_indices(keys) {
        let partition_values: Vec<f64> = rows.iter().map(|&i| values[i]).collect();
        let Some(cutoff) = percentile(&partition_values, 100.0 - quantile) else {
            continue;
        };

        let before = kept.len();
        kept.extend(rows.iter().copied().filter(|&i| values[i] > cutoff));
        debug!(
            partition = key,
            rows = rows.len(),
            kept = kept.len() - before,
            cutoff,
            "Applied percentile cutoff"
        );
    }

    Ok(kept)
}

/// Keeps, for every value of `partition_column`, the rows whose value lies
/// strictly above that partition's `(100 - quantile)`-th percentile.
///
/// A partition with a single row never survives: its cutoff is its own value.
///
/// # Errors
/// Returns `InvalidArgument` for a quantile outside `[0, 100]` or an unknown column.
pub fn filter_by_percentile(
    table: &TradeTable,
    quantile: f64,
    value_column: &str,
    partition_column: &str,
) -> Result<TradeTable> {
    let kept = retained_indices(table, quantile, value_column, partition_column)?;
    Ok(table.take(&kept))
}

/// Runs the reporter and partner filters independently and unions the results.
///
/// Reporter-side rows come first; a pair kept by both sides appears once.
///
/// # Errors
/// Same as [`filter_by_percentile`].
pub fn filter_by_percentile_combined(
    table: &TradeTable,
    quantile: f64,
    value_column: &str,
    reporter_column: &str,
    partner_column: &str,
) -> Result<TradeTable> {
    let reporter_side = retained_indices(table, quantile, value_column, reporter_column)?;
    let partner_side = retained_indices(table, quantile, value_column, partner_column)?;

    let reporters = table.text(reporter_column)?;
    let partners = table.text(partner_column)?;

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let kept: Vec<usize> = reporter_side
        .into_iter()
        .chain(partner_side)
        .filter(|&i| seen.insert((reporters[i].as_str(), partners[i].as_str())))
        .collect();

    Ok(table.take(&kept))
}

/// Dispatches to the filter matching `perspective`.
///
/// # Errors
/// Same as [`filter_by_percentile`].
pub fn filter_by_perspective(
    table: &TradeTable,
    quantile: f64,
    perspective: Perspective,
    columns: &ColumnNames,
) -> Result<TradeTable> {
    let filtered = match perspective {
        Perspective::Reporter => {
            filter_by_percentile(table, quantile, &columns.value, &columns.reporter)?
        }
        Perspective::Partner => {
            filter_by_percentile(table, quantile, &columns.value, &columns.partner)?
        }
        Perspective::Both => filter_by_percentile_combined(
            table,
            quantile,
            &columns.value,
            &columns.reporter,
            &columns.partner,
        )?,
    };

    tracing::info!(
        perspective = perspective.as_str(),
        quantile,
        input_rows = table.len(),
        kept_rows = filtered.len(),
        "Filtered trade edges"
    );

    Ok(filtered)
}
