//! # EVTX Flatten
//!
//! Converts Windows event log files (`.evtx`) into one flat table with a
//! column per distinct field path.
//!
//! ## How it works
//!
//! Every decoded event is a tree of named fields. A run makes two passes:
//!
//! 1. **Flatten**: each tree becomes a record of `dotted.path -> text`, and the
//!    set of paths seen so far grows.
//! 2. **Project**: once every record is known, paths are sorted byte-wise into
//!    the column schema and every record is written as a row in that order,
//!    with empty cells for fields it lacks.
//!
//! The header shows only the last path segment (`System.Provider.Name` is
//! shown as `Name`). Two different paths with the same last segment keep two
//! columns with identical header text; the converter logs a warning but does
//! not rename them.
//!
//! ## Quick Start
//!
//! ```no_run
//! use evtx_flatten::{EvtxReader, CsvWriter};
//!
//! let reader = EvtxReader::from_file("Security.evtx")?;
//! let conversion = reader.read_all()?;
//!
//! println!("{}", conversion.stats().summary());
//!
//! CsvWriter::new("output.csv").write(&conversion)?;
//! # Ok::<(), evtx_flatten::Error>(())
//! ```
//!
//! ## Without an EVTX file
//!
//! The flattening core accepts any source of trees:
//!
//! ```
//! use evtx_flatten::{flatten, project, unify, EventTree};
//! use serde_json::json;
//!
//! let a = flatten(EventTree::from(json!({"System": {"EventID": 4624}, "Level": 4})))?;
//! let b = flatten(EventTree::from(json!({"System": {"EventID": 4625}})))?;
//!
//! let schema = unify(&[a.clone(), b.clone()]);
//! assert_eq!(schema.labels(), vec!["Level", "EventID"]);
//! assert_eq!(project(&b, &schema).values(), ["", "4625"]);
//! # Ok::<(), evtx_flatten::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! A record that fails to decode is skipped and counted; opening the input or
//! creating the output fails the whole run:
//!
//! ```no_run
//! use evtx_flatten::{EvtxReader, Error};
//!
//! match EvtxReader::from_file("Security.evtx") {
//!     Ok(reader) => {
//!         let conversion = reader.read_all()?;
//!         eprintln!("skipped {}", conversion.stats().records_skipped);
//!     }
//!     Err(Error::InvalidFormat(msg)) => eprintln!("Not an EVTX file: {}", msg),
//!     Err(err) => eprintln!("Error: {}", err),
//! }
//! # Ok::<(), evtx_flatten::Error>(())
//! ```

// Public API modules
pub mod converter;
pub mod error;
pub mod reader;
pub mod writer;

// Flattening core
pub mod flatten;
pub mod projector;
pub mod schema;

// Re-export commonly used types
pub use converter::{Conversion, ConversionStats, Converter, ConverterBuilder};
pub use error::{Error, Result};
pub use flatten::{flatten, flatten_with, FlattenOptions};
pub use projector::{project, project_values};
pub use reader::{EvtxReader, EvtxReaderBuilder};
pub use schema::{short_label, unify, FieldUniverse};
pub use writer::{write_schema_json, CsvWriter, ParquetWriter, ParquetWriterBuilder, WriteStats};

pub use models::{Column, ColumnSchema, EventTree, FlatRecord, OutputFormat, OutputRow, Scalar};

// Internal modules (public but not part of the high-level API)
pub mod decoder;
pub mod formats;
pub mod models;
