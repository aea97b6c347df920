use anyhow::{Context, Result};
use csv::Writer;
use std::fs::File;
use std::path::Path;
use trade_map_core::{NodeTable, TradeTable};

pub struct CsvStorage;

impl CsvStorage {
    /// Writes the node table to CSV.
    ///
    /// Format: iso,aggregate_value,lat,long (lat/long empty when unresolved)
    ///
    /// # Errors
    /// Returns error if file cannot be created or writing fails
    pub fn write_nodes(path: impl AsRef<Path>, nodes: &NodeTable) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        let mut writer = Writer::from_writer(file);

        writer.write_record(["iso", "aggregate_value", "lat", "long"])?;

        for node in nodes.iter() {
            writer.write_record(&[
                node.iso.clone(),
                node.aggregate_value.to_string(),
                node.lat().map(|v| v.to_string()).unwrap_or_default(),
                node.lon().map(|v| v.to_string()).unwrap_or_default(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Writes every column of an edge table to CSV, text columns first.
    ///
    /// # Errors
    /// Returns error if file cannot be created or writing fails
    pub fn write_edges(path: impl AsRef<Path>, edges: &TradeTable) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        let mut writer = Writer::from_writer(file);

        let text: Vec<(&str, &[String])> = edges.text_columns().collect();
        let numeric: Vec<(&str, &[f64])> = edges.numeric_columns().collect();

        let header: Vec<&str> = text
            .iter()
            .map(|(name, _)| *name)
            .chain(numeric.iter().map(|(name, _)| *name))
            .collect();
        writer.write_record(&header)?;

        for row in 0..edges.len() {
            let record: Vec<String> = text
                .iter()
                .map(|(_, values)| values[row].clone())
                .chain(numeric.iter().map(|(_, values)| values[row].to_string()))
                .collect();
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }
}
