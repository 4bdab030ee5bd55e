//! Aligns flattened records to a finished column schema.

use crate::models::{ColumnSchema, FlatRecord, OutputRow};

/// Values of `record` in schema order; `None` where the record lacks the field.
pub fn project_values<'a>(record: &'a FlatRecord, schema: &ColumnSchema) -> Vec<Option<&'a str>> {
    schema
        .iter()
        .map(|column| record.get(&column.full_path))
        .collect()
}

/// One output row. Absent fields become empty strings; the length is always `schema.len()`.
pub fn project(record: &FlatRecord, schema: &ColumnSchema) -> OutputRow {
    OutputRow(
        project_values(record, schema)
            .into_iter()
            .map(|value| value.unwrap_or_default().to_string())
            .collect(),
    )
}
