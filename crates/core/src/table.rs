//! Column-oriented trade table.
//!
//! A `TradeTable` holds named text columns (country codes) and named numeric
//! columns (trade values). All columns share one length and every transform
//! preserves row order.

use crate::error::{Result, TradeMapError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One directed trade observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Recording country (ISO 3166-1 alpha-3)
    pub reporter_iso: String,
    /// Counterpart country (ISO 3166-1 alpha-3)
    pub partner_iso: String,
    /// Trade value, e.g. FOB value
    pub value: f64,
}

impl TradeRecord {
    /// Creates a new record.
    pub fn new(reporter_iso: impl Into<String>, partner_iso: impl Into<String>, value: f64) -> Self {
        Self {
            reporter_iso: reporter_iso.into(),
            partner_iso: partner_iso.into(),
            value,
        }
    }
}

/// Names of the columns the pipeline reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub reporter: String,
    pub partner: String,
    pub value: String,
    /// Output column for symmetric pair totals.
    pub total: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            reporter: "reporterISO".to_string(),
            partner: "partnerISO".to_string(),
            value: "fobvalue".to_string(),
            total: "total_trade".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct TextColumn {
    name: String,
    values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct NumericColumn {
    name: String,
    values: Vec<f64>,
}

/// An ordered table of directed trade rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeTable {
    text: Vec<TextColumn>,
    numeric: Vec<NumericColumn>,
    len: usize,
}

impl TradeTable {
    /// Creates a table with no columns and no rows.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from records using the reporter/partner/value column names.
    #[must_use]
    pub fn from_records(records: &[TradeRecord], names: &ColumnNames) -> Self {
        Self {
            text: vec![
                TextColumn {
                    name: names.reporter.clone(),
                    values: records.iter().map(|r| r.reporter_iso.clone()).collect(),
                },
                TextColumn {
                    name: names.partner.clone(),
                    values: records.iter().map(|r| r.partner_iso.clone()).collect(),
                },
            ],
            numeric: vec![NumericColumn {
                name: names.value.clone(),
                values: records.iter().map(|r| r.value).collect(),
            }],
            len: records.len(),
        }
    }

    /// Adds a text column.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the name is empty or taken, or the length
    /// does not match the table.
    pub fn with_text_column(mut self, name: impl Into<String>, values: Vec<String>) -> Result<Self> {
        let name = name.into();
        self.check_new_column(&name, values.len())?;
        if self.has_column(&name) {
            return Err(TradeMapError::invalid_argument(format!(
                "column already exists: {name}"
            )));
        }
        self.len = values.len();
        self.text.push(TextColumn { name, values });
        Ok(self)
    }

    /// Adds a numeric column, or replaces an existing numeric column of the same name.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the name is empty or used by a text column,
    /// or the length does not match the table.
    pub fn with_numeric_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        self.set_numeric_column(name, values)?;
        Ok(self)
    }

    /// In-place form of [`TradeTable::with_numeric_column`].
    ///
    /// # Errors
    /// Same as [`TradeTable::with_numeric_column`].
    pub fn set_numeric_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        self.check_new_column(&name, values.len())?;
        if self.text.iter().any(|c| c.name == name) {
            return Err(TradeMapError::invalid_argument(format!(
                "column {name} is a text column"
            )));
        }
        self.len = values.len();
        match self.numeric.iter_mut().find(|c| c.name == name) {
            Some(column) => column.values = values,
            None => self.numeric.push(NumericColumn { name, values }),
        }
        Ok(())
    }

    fn check_new_column(&self, name: &str, len: usize) -> Result<()> {
        if name.is_empty() {
            return Err(TradeMapError::invalid_argument("column name cannot be empty"));
        }
        if self.column_count() > 0 && len != self.len {
            return Err(TradeMapError::invalid_argument(format!(
                "column {name} has {len} rows, table has {}",
                self.len
            )));
        }
        Ok(())
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.text.len() + self.numeric.len()
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.text.iter().any(|c| c.name == name) || self.numeric.iter().any(|c| c.name == name)
    }

    /// Text columns as `(name, values)` in insertion order.
    pub fn text_columns(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.text.iter().map(|c| (c.name.as_str(), c.values.as_slice()))
    }

    /// Numeric columns as `(name, values)` in insertion order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.numeric
            .iter()
            .map(|c| (c.name.as_str(), c.values.as_slice()))
    }

    /// Returns a text column by name.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if no text column has that name.
    pub fn text(&self, name: &str) -> Result<&[String]> {
        self.text
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| TradeMapError::unknown_column(name))
    }

    /// Returns a numeric column by name.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if no numeric column has that name.
    pub fn numeric(&self, name: &str) -> Result<&[f64]> {
        self.numeric
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| TradeMapError::unknown_column(name))
    }

    /// Selects rows by index, in the given order, keeping every column.
    ///
    /// Indices must be in bounds.
    #[must_use]
    pub fn take(&self, indices: &[usize]) -> Self {
        Self {
            text: self
                .text
                .iter()
                .map(|c| TextColumn {
                    name: c.name.clone(),
                    values: indices.iter().map(|&i| c.values[i].clone()).collect(),
                })
                .collect(),
            numeric: self
                .numeric
                .iter()
                .map(|c| NumericColumn {
                    name: c.name.clone(),
                    values: indices.iter().map(|&i| c.values[i]).collect(),
                })
                .collect(),
            len: indices.len(),
        }
    }

    /// Reads the table back as records.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if any of the named columns is missing.
    pub fn records(&self, names: &ColumnNames) -> Result<Vec<TradeRecord>> {
        let reporters = self.text(&names.reporter)?;
        let partners = self.text(&names.partner)?;
        let values = self.numeric(&names.value)?;

        Ok(reporters
            .iter()
            .zip(partners)
            .zip(values)
            .map(|((r, p), v)| TradeRecord::new(r.clone(), p.clone(), *v))
            .collect())
    }
}

/// Groups row indices by key, with groups in order of first appearance.
pub(crate) fn partition_indices(keys: &[String]) -> Vec<(&str, Vec<usize>)> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();

    for (row, key) in keys.iter().enumerate() {
        let slot = *slots.entry(key.as_str()).or_insert_with(|| {
            groups.push((key.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(row);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TradeTable {
        TradeTable::from_records(
            &[
                TradeRecord::new("USA", "CAN", 100.0),
                TradeRecord::new("CAN", "USA", 50.0),
                TradeRecord::new("USA", "MEX", 10.0),
            ],
            &ColumnNames::default(),
        )
    }

    #[test]
    fn test_from_records_uses_configured_names() {
        let table = sample();
        assert_eq!(table.len(), 3);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.text("reporterISO").unwrap()[2], "USA");
        assert_eq!(table.text("partnerISO").unwrap()[2], "MEX");
        assert_eq!(table.numeric("fobvalue").unwrap(), &[100.0, 50.0, 10.0]);
    }

    #[test]
    fn test_unknown_column_is_invalid_argument() {
        let table = sample();
        assert!(matches!(
            table.numeric("missing"),
            Err(TradeMapError::InvalidArgument(_))
        ));
        // text columns are not visible through the numeric accessor
        assert!(table.numeric("reporterISO").is_err());
    }

    #[test]
    fn test_with_numeric_column_rejects_ragged_length() {
        let result = sample().with_numeric_column("other", vec![1.0]);
        assert!(matches!(result, Err(TradeMapError::InvalidArgument(_))));
    }

    #[test]
    fn test_with_numeric_column_overwrites() {
        let table = sample()
            .with_numeric_column("fobvalue", vec![1.0, 2.0, 3.0])
            .unwrap();
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.numeric("fobvalue").unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_numeric_column_cannot_shadow_text_column() {
        let result = sample().with_numeric_column("reporterISO", vec![0.0; 3]);
        assert!(result.is_err());
    }

    #[test]
    fn test_with_text_column_on_empty_table_sets_length() {
        let table = TradeTable::new()
            .with_text_column("a", vec!["X".to_string(), "Y".to_string()])
            .unwrap()
            .with_numeric_column("v", vec![1.0, 2.0])
            .unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.with_text_column("a", vec![String::new(); 2]).is_err());
    }

    #[test]
    fn test_take_preserves_given_order() {
        let table = sample().take(&[2, 0]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.numeric("fobvalue").unwrap(), &[10.0, 100.0]);
        assert_eq!(table.text("partnerISO").unwrap(), &["MEX", "CAN"]);
    }

    #[test]
    fn test_records_round_trip() {
        let records = sample().records(&ColumnNames::default()).unwrap();
        assert_eq!(records[1], TradeRecord::new("CAN", "USA", 50.0));
    }

    #[test]
    fn test_partition_indices_first_appearance_order() {
        let keys: Vec<String> = ["B", "A", "B", "C", "A"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        let groups = partition_indices(&keys);
        assert_eq!(
            groups,
            vec![("B", vec![0, 2]), ("A", vec![1, 4]), ("C", vec![3])]
        );
    }
}
