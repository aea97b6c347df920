//! Data loading and export for trade network maps.
//!
//! This crate provides:
//! - Trade table loading from Feather/Arrow IPC, Parquet and CSV files
//! - CSV and Parquet exports of node and edge tables
//! - JSON output of the render plan

pub mod csv_storage;
pub mod loader;
pub mod parquet_storage;
pub mod plan_writer;

pub use csv_storage::CsvStorage;
pub use loader::{InputFormat, TableLoader};
pub use parquet_storage::ParquetStorage;
pub use plan_writer::PlanWriter;
