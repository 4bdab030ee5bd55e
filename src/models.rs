use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Parquet,
}

/// Leaf value of an [`EventTree`].
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Value the decoder could not produce (JSON `null`)
    Missing,
    Bool(bool),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
    /// Arrays are leaves; their elements are never turned into columns
    List(Vec<serde_json::Value>),
}

/// One decoded event: either a leaf or an ordered mapping of named children.
#[derive(Debug, Clone, PartialEq)]
pub enum EventTree {
    Scalar(Scalar),
    Node(Vec<(String, EventTree)>),
}

impl EventTree {
    pub fn node<K: Into<String>>(fields: Vec<(K, EventTree)>) -> Self {
        EventTree::Node(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_node(&self) -> bool {
        matches!(self, EventTree::Node(_))
    }
}

impl From<serde_json::Value> for EventTree {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Object(map) => EventTree::Node(
                map.into_iter()
                    .map(|(key, child)| (key, EventTree::from(child)))
                    .collect(),
            ),
            Value::Null => EventTree::Scalar(Scalar::Missing),
            Value::Bool(b) => EventTree::Scalar(Scalar::Bool(b)),
            Value::Number(n) => {
                let scalar = if let Some(i) = n.as_i64() {
                    Scalar::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Scalar::Unsigned(u)
                } else {
                    n.as_f64().map(Scalar::Float).unwrap_or(Scalar::Missing)
                };
                EventTree::Scalar(scalar)
            }
            Value::String(s) => EventTree::Scalar(Scalar::Text(s)),
            Value::Array(items) => EventTree::Scalar(Scalar::List(items)),
        }
    }
}

impl From<&str> for EventTree {
    fn from(value: &str) -> Self {
        EventTree::Scalar(Scalar::Text(value.to_string()))
    }
}

impl From<String> for EventTree {
    fn from(value: String) -> Self {
        EventTree::Scalar(Scalar::Text(value))
    }
}

impl From<i64> for EventTree {
    fn from(value: i64) -> Self {
        EventTree::Scalar(Scalar::Integer(value))
    }
}

impl From<u64> for EventTree {
    fn from(value: u64) -> Self {
        EventTree::Scalar(Scalar::Unsigned(value))
    }
}

impl From<f64> for EventTree {
    fn from(value: f64) -> Self {
        EventTree::Scalar(Scalar::Float(value))
    }
}

impl From<bool> for EventTree {
    fn from(value: bool) -> Self {
        EventTree::Scalar(Scalar::Bool(value))
    }
}

/// A flattened event: full dotted path to stringified leaf value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRecord {
    fields: HashMap<String, String>,
}

impl FlatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous one if the path was already taken.
    pub fn insert(&mut self, full_path: String, value: String) -> Option<String> {
        self.fields.insert(full_path, value)
    }

    pub fn get(&self, full_path: &str) -> Option<&str> {
        self.fields.get(full_path).map(String::as_str)
    }

    pub fn contains(&self, full_path: &str) -> bool {
        self.fields.contains_key(full_path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FlatRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// One output column: the unique full path and the header text shown for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub full_path: String,
    pub label: String,
}

/// Columns in output order. Full paths are unique, labels are not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnSchema {
    columns: Vec<Column>,
}

impl ColumnSchema {
    pub(crate) fn from_columns(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn full_paths(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.full_path.as_str()).collect()
    }

    /// Header text, in column order.
    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    /// Labels shared by more than one column, with the full paths behind them.
    ///
    /// Collisions are reported, never resolved: the header still repeats the label.
    pub fn label_collisions(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut by_label: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for column in &self.columns {
            by_label
                .entry(column.label.as_str())
                .or_default()
                .push(column.full_path.as_str());
        }
        by_label.retain(|_, paths| paths.len() > 1);
        by_label
    }
}

impl<'a> IntoIterator for &'a ColumnSchema {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

/// One projected row, aligned by position with a [`ColumnSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow(pub Vec<String>);

impl OutputRow {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tree_from_json_keeps_order() {
        let tree = EventTree::from(json!({"z": 1, "a": {"m": "x", "b": null}}));
        match tree {
            EventTree::Node(fields) => {
                let keys: Vec<_> = fields.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, vec!["z", "a"]);
                assert!(fields[1].1.is_node());
            }
            EventTree::Scalar(_) => panic!("expected a node"),
        }
    }

    #[test]
    fn test_tree_from_json_numbers() {
        assert_eq!(EventTree::from(json!(-3)), EventTree::Scalar(Scalar::Integer(-3)));
        assert_eq!(
            EventTree::from(json!(u64::MAX)),
            EventTree::Scalar(Scalar::Unsigned(u64::MAX))
        );
        assert_eq!(EventTree::from(json!(1.5)), EventTree::Scalar(Scalar::Float(1.5)));
    }

    #[test]
    fn test_label_collisions() {
        let schema = ColumnSchema::from_columns(vec![
            Column { full_path: "A.Name".into(), label: "Name".into() },
            Column { full_path: "B.Name".into(), label: "Name".into() },
            Column { full_path: "B.Id".into(), label: "Id".into() },
        ]);
        let collisions = schema.label_collisions();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions["Name"], vec!["A.Name", "B.Name"]);
    }
}
