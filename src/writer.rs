//! High-level API for writing flattened event records.

use crate::converter::Conversion;
use crate::error::{Error, Result};
use crate::formats::csv::CsvFormatter;
use crate::formats::parquet::ParquetFormatter;
use crate::models::ColumnSchema;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_CHUNK_SIZE: usize = 50_000;

/// Writer for outputting flattened records as one CSV file.
///
/// The header row holds the short label of every column, in schema order.
/// Distinct full paths that end in the same field name produce repeated
/// header text; nothing is renamed.
///
/// # Examples
///
/// ```no_run
/// use evtx_flatten::{EvtxReader, CsvWriter};
///
/// let conversion = EvtxReader::from_file("Security.evtx")?.read_all()?;
///
/// CsvWriter::new("output.csv")
///     .write(&conversion)?;
/// # Ok::<(), evtx_flatten::Error>(())
/// ```
pub struct CsvWriter {
    output_path: PathBuf,
    chunk_size: usize,
}

impl CsvWriter {
    /// Create a new CSV writer targeting `output_path`. The file is created or truncated.
    pub fn new<P: AsRef<Path>>(output_path: P) -> Self {
        Self {
            output_path: output_path.as_ref().to_path_buf(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Number of rows projected and handed to the CSV writer at a time.
    ///
    /// This only bounds the memory used by projected rows; the output is
    /// always a single file. Default is 50,000.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Write the header and every record.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutputUnavailable` if the file cannot be created, or
    /// `Error::Output` / `Error::Io` if writing fails part way.
    pub fn write(self, conversion: &Conversion) -> Result<()> {
        self.write_with_stats(conversion).map(|_| ())
    }

    /// Write the CSV file and return statistics about the write operation.
    pub fn write_with_stats(self, conversion: &Conversion) -> Result<WriteStats> {
        let formatter = CsvFormatter::new(self.output_path, self.chunk_size);
        let num_chunks = formatter.convert(conversion)?;

        Ok(WriteStats::new(conversion, num_chunks, self.chunk_size))
    }
}

/// Writer for outputting flattened records to Apache Parquet.
///
/// Columns are named by full path and carry their short label in the field
/// metadata; absent fields are stored as nulls.
///
/// # Examples
///
/// ```no_run
/// use evtx_flatten::{EvtxReader, ParquetWriter};
///
/// let conversion = EvtxReader::from_file("Security.evtx")?.read_all()?;
///
/// ParquetWriter::new("output_dir")
///     .chunk_size(100_000)
///     .write(&conversion)?;
/// # Ok::<(), evtx_flatten::Error>(())
/// ```
pub struct ParquetWriter {
    output_directory: PathBuf,
    chunk_size: usize,
}

impl ParquetWriter {
    /// Create a new Parquet writer that will write to the specified directory.
    pub fn new<P: AsRef<Path>>(output_directory: P) -> Self {
        Self {
            output_directory: output_directory.as_ref().to_path_buf(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the number of rows per Parquet file. Default is 50,000.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Write `file_part000.parquet`, `file_part001.parquet`, ...
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The output directory cannot be created
    /// - The Parquet files cannot be written
    /// - There are no records or no columns
    pub fn write(self, conversion: &Conversion) -> Result<()> {
        self.write_with_stats(conversion).map(|_| ())
    }

    pub fn write_with_stats(self, conversion: &Conversion) -> Result<WriteStats> {
        let formatter = ParquetFormatter::new(self.output_directory, self.chunk_size);
        let num_chunks = formatter.convert(conversion)?;

        Ok(WriteStats::new(conversion, num_chunks, self.chunk_size))
    }
}

/// Write the column schema as a JSON array of `{"full_path", "label"}` objects.
///
/// The CSV header only carries labels; this file maps every header position
/// back to the full path it came from.
///
/// # Examples
///
/// ```no_run
/// use evtx_flatten::{writer::write_schema_json, EvtxReader};
///
/// let conversion = EvtxReader::from_file("Security.evtx")?.read_all()?;
/// write_schema_json(conversion.schema(), "schema.json")?;
/// # Ok::<(), evtx_flatten::Error>(())
/// ```
pub fn write_schema_json<P: AsRef<Path>>(schema: &ColumnSchema, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| Error::OutputUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    let mut out = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut out, schema).map_err(|e| Error::Output(e.to_string()))?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStats {
    /// Total number of records written
    pub num_records: usize,
    /// Number of columns in the schema
    pub num_columns: usize,
    /// Number of batches (CSV) or files (Parquet) written
    pub num_chunks: usize,
    /// Rows per chunk
    pub chunk_size: usize,
}

impl WriteStats {
    fn new(conversion: &Conversion, num_chunks: usize, chunk_size: usize) -> Self {
        Self {
            num_records: conversion.len(),
            num_columns: conversion.schema().len(),
            num_chunks,
            chunk_size,
        }
    }

    /// Get a human-readable summary of the write operation.
    pub fn summary(&self) -> String {
        format!(
            "Wrote {} records x {} columns in {} chunk(s) ({} rows per chunk)",
            self.num_records, self.num_columns, self.num_chunks, self.chunk_size
        )
    }
}

/// Builder for configuring Parquet write options.
///
/// # Examples
///
/// ```no_run
/// use evtx_flatten::{EvtxReader, ParquetWriterBuilder};
///
/// let conversion = EvtxReader::from_file("Security.evtx")?.read_all()?;
///
/// ParquetWriterBuilder::new()
///     .output_directory("./output")
///     .chunk_size(75_000)
///     .build()?
///     .write(&conversion)?;
/// # Ok::<(), evtx_flatten::Error>(())
/// ```
pub struct ParquetWriterBuilder {
    output_directory: Option<PathBuf>,
    chunk_size: usize,
}

impl ParquetWriterBuilder {
    pub fn new() -> Self {
        Self {
            output_directory: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn output_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_directory = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Build the Parquet writer.
    ///
    /// # Errors
    ///
    /// Returns an error if output_directory was not set.
    pub fn build(self) -> Result<ParquetWriter> {
        let output_directory = self
            .output_directory
            .ok_or_else(|| Error::Other(anyhow::anyhow!("Output directory not set")))?;

        Ok(ParquetWriter {
            output_directory,
            chunk_size: self.chunk_size,
        })
    }
}

impl Default for ParquetWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
