//! Command-line interface for the EVTX flattener.
//!
//! Converts one .evtx file into a single CSV (or a directory of Parquet files).

use anyhow::Result;
use clap::{Parser, ValueEnum};
use evtx_flatten::formats::preview;
use evtx_flatten::{write_schema_json, CsvWriter, EvtxReaderBuilder, OutputFormat, ParquetWriter};
use log::{info, warn, LevelFilter};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Parquet,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => OutputFormat::Csv,
            Format::Parquet => OutputFormat::Parquet,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Flatten .evtx event logs into a single CSV table",
    long_about = "Decodes every event of a Windows .evtx file, flattens its nested fields into \
                  dotted paths and writes one row per event under a unified, sorted header.\n\n\
                  Header cells show only the last path segment, so distinct fields may share a name."
)]
struct Args {
    /// Path to the .evtx file to convert
    #[arg(long, value_name = "FILE")]
    file: PathBuf,

    /// Output file (CSV) or directory (Parquet) [default: output.csv / output]
    #[arg(short, long, value_name = "OUT")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "csv")]
    format: Format,

    /// Number of rows per written chunk
    #[arg(long, default_value = "50000")]
    chunk_size: usize,

    /// Records nested deeper than this are skipped
    #[arg(long, default_value = "128")]
    max_depth: usize,

    /// Also write the column list (full path and header label) as JSON
    #[arg(long, value_name = "PATH")]
    schema_json: Option<PathBuf>,

    /// Log the first N rows as a table
    #[arg(long, value_name = "N")]
    preview: Option<usize>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn has_evtx_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("evtx"))
        .unwrap_or(false)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .format_timestamp(None)
        .init();

    if !has_evtx_extension(&args.file) {
        anyhow::bail!("only .evtx files are supported, got '{}'", args.file.display());
    }

    let format = OutputFormat::from(args.format);
    let output = args.output.clone().unwrap_or_else(|| match format {
        OutputFormat::Csv => PathBuf::from("output.csv"),
        OutputFormat::Parquet => PathBuf::from("output"),
    });

    info!("📄 Processing: {}", args.file.display());
    let start_time = Instant::now();

    let reader = EvtxReaderBuilder::new()
        .max_depth(args.max_depth)
        .from_file(&args.file)?;

    let (major, minor) = reader.version();
    let header = reader.header();
    info!("   ├─ Version: {}.{}", major, minor);
    info!(
        "   ├─ {} chunk(s), next record id {}",
        header.chunk_count, header.next_record_id
    );
    if header.is_dirty() {
        warn!("   ├─ File was not closed cleanly, header counters may be stale");
    }

    let conversion = reader.read_all()?;
    info!("   ├─ {}", conversion.stats().summary());
    info!("   ├─ Found {} unique fields", conversion.schema().len());

    if let Some(limit) = args.preview {
        info!("   ├─ Preview:\n{}", preview(&conversion, limit)?);
    }

    let t1 = Instant::now();
    let stats = match format {
        OutputFormat::Csv => CsvWriter::new(&output)
            .chunk_size(args.chunk_size)
            .write_with_stats(&conversion)?,
        OutputFormat::Parquet => ParquetWriter::new(&output)
            .chunk_size(args.chunk_size)
            .write_with_stats(&conversion)?,
    };

    info!("   ├─ Wrote {} in {:.2?}", output.display(), t1.elapsed());
    info!("   ├─ {}", stats.summary());

    if let Some(schema_path) = &args.schema_json {
        write_schema_json(conversion.schema(), schema_path)?;
        info!("   ├─ Schema: {}", schema_path.display());
    }
    info!("   └─ ✓ Total time: {:.2?}", start_time.elapsed());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evtx_extension() {
        assert!(has_evtx_extension(Path::new("Security.evtx")));
        assert!(has_evtx_extension(Path::new("logs/System.EVTX")));
        assert!(!has_evtx_extension(Path::new("Security.evt")));
        assert!(!has_evtx_extension(Path::new("evtx")));
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["evtx-flatten", "--file", "a.evtx"]);
        assert_eq!(args.file, PathBuf::from("a.evtx"));
        assert!(args.output.is_none());
        assert!(matches!(args.format, Format::Csv));
        assert_eq!(args.chunk_size, 50_000);
        assert_eq!(args.max_depth, 128);
        assert!(args.schema_json.is_none());
    }

    #[test]
    fn test_args_schema_json() {
        let args = Args::parse_from([
            "evtx-flatten",
            "--file",
            "a.evtx",
            "--schema-json",
            "columns.json",
        ]);
        assert_eq!(args.schema_json, Some(PathBuf::from("columns.json")));
    }
}
