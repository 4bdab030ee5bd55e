//! Column schema discovery across every flattened record of a run.

use std::collections::BTreeSet;

use crate::flatten::PATH_SEPARATOR;
use crate::models::{Column, ColumnSchema, FlatRecord};

/// Every full path observed so far.
///
/// The set only grows. `merge` is a plain union, so partial universes built
/// over disjoint slices of the input can be combined in any order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldUniverse {
    paths: BTreeSet<String>,
}

impl FieldUniverse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: &[FlatRecord]) -> Self {
        let mut universe = Self::new();
        for record in records {
            universe.observe(record);
        }
        universe
    }

    /// Add the paths of one record.
    pub fn observe(&mut self, record: &FlatRecord) {
        for path in record.paths() {
            if !self.paths.contains(path) {
                self.paths.insert(path.to_string());
            }
        }
    }

    pub fn merge(&mut self, other: FieldUniverse) {
        self.paths.extend(other.paths);
    }

    pub fn contains(&self, full_path: &str) -> bool {
        self.paths.contains(full_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Freeze the universe into output columns.
    ///
    /// `BTreeSet<String>` iterates in byte-wise order, which is the column order.
    pub fn into_schema(self) -> ColumnSchema {
        let columns = self
            .paths
            .into_iter()
            .map(|full_path| Column {
                label: short_label(&full_path).to_string(),
                full_path,
            })
            .collect();
        ColumnSchema::from_columns(columns)
    }
}

/// Compute the schema for a complete set of records.
pub fn unify(records: &[FlatRecord]) -> ColumnSchema {
    FieldUniverse::from_records(records).into_schema()
}

/// Last path segment, or the whole path when it has no separator.
pub fn short_label(full_path: &str) -> &str {
    match full_path.rfind(PATH_SEPARATOR) {
        Some(pos) => &full_path[pos + PATH_SEPARATOR.len_utf8()..],
        None => full_path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(paths: &[&str]) -> FlatRecord {
        paths.iter().map(|p| (*p, "v")).collect()
    }

    #[test]
    fn test_short_label() {
        assert_eq!(short_label("System.Provider.Name"), "Name");
        assert_eq!(short_label("Level"), "Level");
        assert_eq!(short_label("Trailing."), "");
    }

    #[test]
    fn test_merge_is_order_independent() {
        let a = FieldUniverse::from_records(&[record(&["x", "b.c"])]);
        let b = FieldUniverse::from_records(&[record(&["b.c", "a"])]);

        let mut ab = a.clone();
        ab.merge(b.clone());
        let mut ba = b;
        ba.merge(a);

        assert_eq!(ab, ba);
        assert_eq!(ab.len(), 3);
        assert_eq!(ab.into_schema().full_paths(), vec!["a", "b.c", "x"]);
    }

    #[test]
    fn test_empty_records_give_empty_schema() {
        assert!(unify(&[]).is_empty());
        assert!(unify(&[FlatRecord::new()]).is_empty());
    }
}
