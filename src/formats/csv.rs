use arrow::csv::WriterBuilder;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use super::{labelled_schema, string_batch};
use crate::converter::Conversion;
use crate::error::{Error, Result};

pub struct CsvFormatter {
    output_path: PathBuf,
    chunk_size: usize,
}

impl CsvFormatter {
    pub fn new(output_path: PathBuf, chunk_size: usize) -> Self {
        Self {
            output_path,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Write the header row and one row per record.
    ///
    /// Quoting is left to the arrow CSV writer. Returns the number of batches written.
    pub fn convert(&self, conversion: &Conversion) -> Result<usize> {
        let file = File::create(&self.output_path).map_err(|source| Error::OutputUnavailable {
            path: self.output_path.clone(),
            source,
        })?;
        let mut out = BufWriter::new(file);

        let chunks = if conversion.schema().is_empty() {
            // Nothing to delimit: an empty header line, then an empty line per record
            for _ in 0..=conversion.len() {
                out.write_all(b"\n")?;
            }
            0
        } else {
            self.write_batches(conversion, &mut out)?
        };

        out.flush()?;
        Ok(chunks)
    }

    fn write_batches<W: Write>(&self, conversion: &Conversion, out: W) -> Result<usize> {
        let schema = labelled_schema(conversion);
        let mut writer = WriterBuilder::new().with_header(true).build(out);

        let total_chunks = (conversion.len() + self.chunk_size - 1) / self.chunk_size;
        for (i, chunk) in conversion.records().chunks(self.chunk_size).enumerate() {
            info!(
                "Writing chunk {}/{}, {} rows",
                i + 1,
                total_chunks,
                chunk.len()
            );
            let batch = string_batch(schema.clone(), conversion, chunk, false)?;
            writer.write(&batch)?;
        }

        Ok(total_chunks)
    }
}
