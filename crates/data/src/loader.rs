//! Loads trade tables from columnar files.
//!
//! Supported formats, chosen by extension: Arrow IPC / Feather (`.feather`,
//! `.arrow`, `.ipc`), Parquet (`.parquet`) and CSV (`.csv`).

use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use trade_map_core::{ColumnNames, TradeMapError, TradeTable};

/// Input file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Ipc,
    Parquet,
    Csv,
}

impl InputFormat {
    /// Picks the format from a file extension.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for unknown or missing extensions.
    pub fn from_path(path: &Path) -> std::result::Result<Self, TradeMapError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("feather" | "arrow" | "ipc") => Ok(Self::Ipc),
            Some("parquet") => Ok(Self::Parquet),
            Some("csv") => Ok(Self::Csv),
            _ => Err(TradeMapError::invalid_argument(format!(
                "unsupported input file: {} (expected .feather, .arrow, .ipc, .parquet or .csv)",
                path.display()
            ))),
        }
    }
}

pub struct TableLoader;

impl TableLoader {
    /// Reads a trade table and checks that the configured columns are present.
    ///
    /// String and categorical columns become text columns and numeric columns
    /// are cast to `f64`; other column types are ignored.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, has an unsupported
    /// extension, or lacks the reporter, partner or value column.
    pub fn load(path: impl AsRef<Path>, columns: &ColumnNames) -> Result<TradeTable> {
        let path = path.as_ref();
        let format = InputFormat::from_path(path)?;
        let frame = Self::read_frame(path, format)
            .with_context(|| format!("Failed to read trade data: {}", path.display()))?;

        let table = Self::from_frame(&frame, columns)?;
        tracing::info!(
            path = %path.display(),
            rows = table.len(),
            columns = table.column_count(),
            "Loaded trade table"
        );
        Ok(table)
    }

    fn read_frame(path: &Path, format: InputFormat) -> Result<DataFrame> {
        let frame = match format {
            InputFormat::Ipc => IpcReader::new(File::open(path)?).finish()?,
            InputFormat::Parquet => ParquetReader::new(File::open(path)?).finish()?,
            InputFormat::Csv => CsvReadOptions::default()
                .with_has_header(true)
                .try_into_reader_with_file_path(Some(path.to_path_buf()))?
                .finish()?,
        };
        Ok(frame)
    }

    /// Converts a polars frame into a trade table.
    ///
    /// # Errors
    /// Returns an error if a text column holds nulls or a required column is missing.
    pub fn from_frame(frame: &DataFrame, columns: &ColumnNames) -> Result<TradeTable> {
        let mut table = TradeTable::new();

        for column in frame.get_columns() {
            // Dictionary-encoded codes (pandas categoricals) load as text.
            let series = match column.dtype() {
                DataType::Categorical(..) | DataType::Enum(..) => column.cast(&DataType::String)?,
                _ => column.clone(),
            };
            let name = series.name().to_string();
            let dtype = series.dtype();

            if matches!(dtype, DataType::String) {
                let values = series
                    .str()?
                    .into_iter()
                    .enumerate()
                    .map(|(row, value)| {
                        value.map(str::to_string).ok_or_else(|| {
                            TradeMapError::invalid_argument(format!(
                                "null in text column {name} at row {row}"
                            ))
                        })
                    })
                    .collect::<std::result::Result<Vec<String>, TradeMapError>>()?;
                table = table.with_text_column(name, values)?;
            } else if dtype.is_numeric() {
                let values: Vec<f64> = series
                    .cast(&DataType::Float64)?
                    .f64()?
                    .into_iter()
                    .map(|value| value.unwrap_or(f64::NAN))
                    .collect();
                table = table.with_numeric_column(name, values)?;
            } else {
                tracing::debug!(column = %name, dtype = %dtype, "Skipping unsupported column");
            }
        }

        table.text(&columns.reporter)?;
        table.text(&columns.partner)?;
        table.numeric(&columns.value)?;

        Ok(table)
    }
}
