//! Total trade per country pair, in both directions.

use crate::error::{Result, TradeMapError};
use crate::table::TradeTable;
use std::collections::HashMap;
use tracing::debug;

/// Attaches to every row `(r, p, v)` the pair total `v + value(p, r)`.
///
/// A missing reverse row counts as zero. The result keeps every input row and
/// column in order; `output_column` is appended, or overwritten if present, so
/// applying this twice gives the same table as applying it once.
///
/// # Errors
/// Returns `InvalidArgument` for unknown columns or an `output_column` equal
/// to `value_column`, and `DuplicateKey` when a directed pair occurs more
/// than once.
pub fn total_trade_per_pair(
    table: &TradeTable,
    value_column: &str,
    reporter_column: &str,
    partner_column: &str,
    output_column: &str,
) -> Result<TradeTable> {
    if output_column == value_column {
        return Err(TradeMapError::invalid_argument(format!(
            "output column {output_column} would overwrite the value column"
        )));
    }

    let values = table.numeric(value_column)?;
    let reporters = table.text(reporter_column)?;
    let partners = table.text(partner_column)?;

    let mut by_pair: HashMap<(&str, &str), f64> = HashMap::with_capacity(table.len());
    for ((reporter, partner), value) in reporters.iter().zip(partners).zip(values) {
        if by_pair
            .insert((reporter.as_str(), partner.as_str()), *value)
            .is_some()
        {
            return Err(TradeMapError::duplicate_key(reporter.as_str(), partner.as_str()));
        }
    }

    let mut missing_reverse = 0usize;
    let totals: Vec<f64> = reporters
        .iter()
        .zip(partners)
        .zip(values)
        .map(|((reporter, partner), value)| {
            let reverse = by_pair
                .get(&(partner.as_str(), reporter.as_str()))
                .copied()
                .unwrap_or_else(|| {
                    missing_reverse += 1;
                    0.0
                });
            value + reverse
        })
        .collect();

    debug!(
        rows = table.len(),
        missing_reverse,
        output_column,
        "Computed symmetric pair totals"
    );

    table.clone().with_numeric_column(output_column, totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ColumnNames, TradeRecord};

    fn table(rows: &[(&str, &str, f64)]) -> TradeTable {
        let records: Vec<TradeRecord> = rows
            .iter()
            .map(|(r, p, v)| TradeRecord::new(*r, *p, *v))
            .collect();
        let names = ColumnNames {
            value: "v".to_string(),
            ..ColumnNames::default()
        };
        TradeTable::from_records(&records, &names)
    }

    fn totals(table: &TradeTable) -> Result<TradeTable> {
        total_trade_per_pair(table, "v", "reporterISO", "partnerISO", "total")
    }

    #[test]
    fn test_pair_totals_with_missing_reverse() {
        let t = table(&[("US", "CA", 100.0), ("CA", "US", 50.0), ("US", "MX", 10.0)]);
        let out = totals(&t).unwrap();

        assert_eq!(out.numeric("total").unwrap(), &[150.0, 150.0, 10.0]);
        // original columns untouched
        assert_eq!(out.numeric("v").unwrap(), &[100.0, 50.0, 10.0]);
        assert_eq!(out.text("partnerISO").unwrap(), &["CA", "US", "MX"]);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_totals_are_symmetric() {
        let t = table(&[
            ("DEU", "FRA", 7.5),
            ("CHN", "USA", 300.0),
            ("FRA", "DEU", 2.5),
            ("USA", "CHN", 120.0),
        ]);
        let out = totals(&t).unwrap();
        let total = out.numeric("total").unwrap();
        assert_eq!(total[0], total[2]);
        assert_eq!(total[1], total[3]);
        assert_eq!(total[1], 420.0);
    }

    #[test]
    fn test_idempotent_when_reapplied() {
        let t = table(&[("US", "CA", 100.0), ("CA", "US", 50.0)]);
        let once = totals(&t).unwrap();
        let twice = totals(&once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.column_count(), 4);
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let t = table(&[("US", "CA", 100.0), ("US", "CA", 1.0)]);
        let err = totals(&t).unwrap_err();
        assert!(matches!(
            err,
            TradeMapError::DuplicateKey { ref reporter, ref partner }
                if reporter == "US" && partner == "CA"
        ));
    }

    #[test]
    fn test_self_pair_counts_itself_as_reverse() {
        let t = table(&[("US", "US", 4.0)]);
        assert_eq!(totals(&t).unwrap().numeric("total").unwrap(), &[8.0]);
    }

    #[test]
    fn test_empty_table() {
        let out = totals(&table(&[])).unwrap();
        assert!(out.is_empty());
        assert!(out.has_column("total"));
    }

    #[test]
    fn test_unknown_column() {
        let t = table(&[("US", "CA", 1.0)]);
        let result = total_trade_per_pair(&t, "fobvalue", "reporterISO", "partnerISO", "total");
        assert!(matches!(result, Err(TradeMapError::InvalidArgument(_))));
    }

    #[test]
    fn test_output_over_value_column_is_rejected() {
        let t = table(&[("US", "CA", 100.0), ("CA", "US", 50.0)]);
        let err = total_trade_per_pair(&t, "v", "reporterISO", "partnerISO", "v").unwrap_err();
        assert!(matches!(err, TradeMapError::InvalidArgument(_)));
        assert!(err.to_string().contains("overwrite"));
    }
}
