use anyhow::Result;
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use trade_map_core::{NodeTable, TradeTable};

pub struct ParquetStorage;

impl ParquetStorage {
    /// Writes the node table to a Parquet file.
    ///
    /// Columns: `iso`, `aggregate_value`, nullable `lat` and `long`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or if writing to the Parquet file fails.
    pub fn write_nodes(path: impl AsRef<Path>, nodes: &NodeTable) -> Result<()> {
        let schema = Arc::new(Schema::new(vec![
            Field::new("iso", DataType::Utf8, false),
            Field::new("aggregate_value", DataType::Float64, false),
            Field::new("lat", DataType::Float64, true),
            Field::new("long", DataType::Float64, true),
        ]));

        let iso: Vec<String> = nodes.iter().map(|n| n.iso.clone()).collect();
        let aggregate: Vec<f64> = nodes.iter().map(|n| n.aggregate_value).collect();
        let lat: Vec<Option<f64>> = nodes.iter().map(|n| n.lat()).collect();
        let long: Vec<Option<f64>> = nodes.iter().map(|n| n.lon()).collect();

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(iso)) as ArrayRef,
                Arc::new(Float64Array::from(aggregate)) as ArrayRef,
                Arc::new(Float64Array::from(lat)) as ArrayRef,
                Arc::new(Float64Array::from(long)) as ArrayRef,
            ],
        )?;

        Self::write_batch(path.as_ref(), schema, &batch)
    }

    /// Writes every column of an edge table to a Parquet file, text columns first.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or if writing to the Parquet file fails.
    pub fn write_edges(path: impl AsRef<Path>, edges: &TradeTable) -> Result<()> {
        let mut fields = Vec::with_capacity(edges.column_count());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(edges.column_count());

        for (name, values) in edges.text_columns() {
            fields.push(Field::new(name, DataType::Utf8, false));
            arrays.push(Arc::new(StringArray::from(values.to_vec())));
        }
        for (name, values) in edges.numeric_columns() {
            fields.push(Field::new(name, DataType::Float64, false));
            arrays.push(Arc::new(Float64Array::from(values.to_vec())));
        }

        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), arrays)?;

        Self::write_batch(path.as_ref(), schema, &batch)
    }

    fn write_batch(path: &Path, schema: Arc<Schema>, batch: &RecordBatch) -> Result<()> {
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(parquet::basic::Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;

        writer.write(batch)?;
        writer.close()?;

        Ok(())
    }
}
