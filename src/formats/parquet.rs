use arrow::datatypes::{DataType, Field, Schema};
use log::info;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::string_batch;
use crate::converter::Conversion;
use crate::error::{Error, Result};

/// Field metadata key holding the short label of a column.
pub const LABEL_METADATA_KEY: &str = "label";

pub struct ParquetFormatter {
    output_directory: PathBuf,
    chunk_size: usize,
}

impl ParquetFormatter {
    pub fn new(output_directory: PathBuf, chunk_size: usize) -> Self {
        Self {
            output_directory,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Write `file_partNNN.parquet` chunks. Returns the number of files written.
    pub fn convert(&self, conversion: &Conversion) -> Result<usize> {
        if conversion.is_empty() || conversion.schema().is_empty() {
            return Err(Error::Output(
                "No columns or records to write to Parquet".to_string(),
            ));
        }

        create_dir_all(&self.output_directory).map_err(|source| Error::OutputUnavailable {
            path: self.output_directory.clone(),
            source,
        })?;

        let schema = Arc::new(parquet_schema(conversion));

        let total_chunks = (conversion.len() + self.chunk_size - 1) / self.chunk_size;
        info!(
            "Generated a total of {} chunks, will now create that total amount of files.",
            total_chunks
        );

        for (i, chunk) in conversion.records().chunks(self.chunk_size).enumerate() {
            info!(
                "Writing chunk {}/{}, {} rows",
                i + 1,
                total_chunks,
                chunk.len()
            );

            let output_path = self
                .output_directory
                .join(format!("file_part{:03}.parquet", i));

            let batch = string_batch(schema.clone(), conversion, chunk, true)?;
            write_batch(&batch, schema.clone(), &output_path)?;
        }

        info!("All chunks have been written");
        Ok(total_chunks)
    }
}

/// Columns are named by full path, which is unique, and carry the label as metadata.
fn parquet_schema(conversion: &Conversion) -> Schema {
    let fields: Vec<Field> = conversion
        .schema()
        .iter()
        .map(|c| {
            Field::new(c.full_path.as_str(), DataType::Utf8, true).with_metadata(HashMap::from([(
                LABEL_METADATA_KEY.to_string(),
                c.label.clone(),
            )]))
        })
        .collect();
    Schema::new(fields)
}

fn write_batch(batch: &arrow::array::RecordBatch, schema: Arc<Schema>, output_path: &Path) -> Result<()> {
    let file = File::create(output_path).map_err(|source| Error::OutputUnavailable {
        path: output_path.to_path_buf(),
        source,
    })?;
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;

    writer.write(batch)?;
    writer.close()?;

    Ok(())
}
