//! Two-pass driver: flatten every decoded record, then freeze the schema.

use log::{debug, warn};
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::flatten::{flatten_with, FlattenOptions};
use crate::models::{ColumnSchema, EventTree, FlatRecord, OutputRow};
use crate::projector::project;
use crate::schema::FieldUniverse;

/// Counters collected while consuming a record source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionStats {
    /// Records flattened and retained
    pub records_read: usize,
    /// Records dropped because they failed to decode or flatten
    pub records_skipped: usize,
    pub elapsed: Duration,
}

impl ConversionStats {
    pub fn summary(&self) -> String {
        format!(
            "Flattened {} records ({} skipped) in {:.2?}",
            self.records_read, self.records_skipped, self.elapsed
        )
    }
}

/// Result of the first pass: all retained records and the schema they share.
///
/// The schema only exists once the whole source has been consumed.
#[derive(Debug, Clone)]
pub struct Conversion {
    records: Vec<FlatRecord>,
    schema: ColumnSchema,
    stats: ConversionStats,
}

impl Conversion {
    pub fn records(&self) -> &[FlatRecord] {
        &self.records
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn stats(&self) -> &ConversionStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Projected rows, in input order.
    pub fn rows(&self) -> impl Iterator<Item = OutputRow> + '_ {
        self.records.iter().map(move |r| project(r, &self.schema))
    }
}

/// Consumes decoded event trees and builds a [`Conversion`].
///
/// # Examples
///
/// ```
/// use evtx_flatten::{Converter, EventTree};
/// use serde_json::json;
///
/// let events = vec![
///     Ok(EventTree::from(json!({"System": {"EventID": 4624}}))),
///     Ok(EventTree::from(json!({"System": {"EventID": 4625, "Level": 0}}))),
/// ];
/// let conversion = Converter::new().convert(events);
///
/// assert_eq!(conversion.schema().labels(), vec!["EventID", "Level"]);
/// assert_eq!(conversion.stats().records_read, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: FlattenOptions,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::new()
    }

    pub fn options(&self) -> &FlattenOptions {
        &self.options
    }

    /// Run the first pass over `source`.
    ///
    /// Per-record failures are logged and counted, never returned.
    pub fn convert<I>(&self, source: I) -> Conversion
    where
        I: IntoIterator<Item = Result<EventTree>>,
    {
        let start = Instant::now();
        let mut records = Vec::new();
        let mut universe = FieldUniverse::new();
        let mut stats = ConversionStats::default();

        for (index, item) in source.into_iter().enumerate() {
            match item.and_then(|tree| flatten_with(tree, &self.options)) {
                Ok(record) => {
                    universe.observe(&record);
                    records.push(record);
                    stats.records_read += 1;
                }
                Err(e) => {
                    stats.records_skipped += 1;
                    warn!("Skipping record #{}: {}", index, e);
                }
            }
        }

        let schema = universe.into_schema();
        for (label, paths) in schema.label_collisions() {
            warn!("Header '{}' is shared by {} columns: {}", label, paths.len(), paths.join(", "));
        }
        debug!("Schema has {} columns", schema.len());

        stats.elapsed = start.elapsed();

        Conversion {
            records,
            schema,
            stats,
        }
    }
}

/// Builder for configuring a [`Converter`].
pub struct ConverterBuilder {
    options: FlattenOptions,
}

impl ConverterBuilder {
    pub fn new() -> Self {
        Self {
            options: FlattenOptions::default(),
        }
    }

    /// Maximum nesting depth before a record is rejected as malformed.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = depth;
        self
    }

    pub fn build(self) -> Converter {
        Converter {
            options: self.options,
        }
    }
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
