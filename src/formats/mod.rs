//! Output formats. Every format stores each column as Utf8.

pub mod csv;
pub mod parquet;

use arrow::array::{ArrayRef, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::util::pretty::pretty_format_batches;
use std::sync::Arc;

use crate::converter::Conversion;
use crate::error::Result;
use crate::models::FlatRecord;
use crate::projector::{project, project_values};

/// Build one batch of string columns from `records`, in schema order.
///
/// With `nulls` set, absent fields become nulls instead of empty strings.
pub(crate) fn string_batch(
    schema: Arc<Schema>,
    conversion: &Conversion,
    records: &[FlatRecord],
    nulls: bool,
) -> Result<RecordBatch> {
    let columns = conversion.schema();

    let arrays: Vec<ArrayRef> = if nulls {
        let rows: Vec<Vec<Option<&str>>> = records
            .iter()
            .map(|r| project_values(r, columns))
            .collect();
        (0..columns.len())
            .map(|i| {
                let values: Vec<Option<&str>> = rows.iter().map(|row| row[i]).collect();
                Arc::new(StringArray::from(values)) as ArrayRef
            })
            .collect()
    } else {
        let rows: Vec<_> = records.iter().map(|r| project(r, columns)).collect();
        (0..columns.len())
            .map(|i| {
                let values: Vec<&str> = rows.iter().map(|row| row.values()[i].as_str()).collect();
                Arc::new(StringArray::from(values)) as ArrayRef
            })
            .collect()
    };

    Ok(RecordBatch::try_new(schema, arrays)?)
}

/// Arrow schema whose field names are the short labels, as shown in a header.
pub(crate) fn labelled_schema(conversion: &Conversion) -> Arc<Schema> {
    let fields: Vec<Field> = conversion
        .schema()
        .iter()
        .map(|c| Field::new(c.label.as_str(), DataType::Utf8, false))
        .collect();
    Arc::new(Schema::new(fields))
}

/// Render the first `limit` rows as a text table.
pub fn preview(conversion: &Conversion, limit: usize) -> Result<String> {
    if conversion.schema().is_empty() {
        return Ok(String::new());
    }

    let head = &conversion.records()[..limit.min(conversion.len())];
    let batch = string_batch(labelled_schema(conversion), conversion, head, false)?;
    Ok(pretty_format_batches(&[batch])?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::Converter;
    use crate::models::EventTree;
    use serde_json::json;

    #[test]
    fn test_preview_limits_rows() {
        let conversion = Converter::new().convert(vec![
            Ok(EventTree::from(json!({"System": {"EventID": 1}}))),
            Ok(EventTree::from(json!({"System": {"EventID": 2}}))),
            Ok(EventTree::from(json!({"System": {"EventID": 3}}))),
        ]);

        let table = preview(&conversion, 2).unwrap();
        assert!(table.contains("EventID"));
        assert!(table.contains("| 1 "));
        assert!(table.contains("| 2 "));
        assert!(!table.contains("| 3 "));
    }

    #[test]
    fn test_preview_without_columns() {
        let conversion = Converter::new().convert(Vec::new());
        assert_eq!(preview(&conversion, 10).unwrap(), "");
    }
}
