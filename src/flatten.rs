//! Turns one nested event tree into a flat `path -> value` record.

use log::debug;

use crate::error::{Error, Result};
use crate::models::{EventTree, FlatRecord, Scalar};

/// Separator placed between field names in a full path.
pub const PATH_SEPARATOR: char = '.';

/// Nesting depth past which a tree is rejected as malformed.
pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlattenOptions {
    pub max_depth: usize,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Flatten a tree with default options.
pub fn flatten(tree: EventTree) -> Result<FlatRecord> {
    flatten_with(tree, &FlattenOptions::default())
}

/// Flatten a tree depth-first, joining field names with `.`.
///
/// The root must be a mapping. Leaves are stringified with [`stringify`].
pub fn flatten_with(tree: EventTree, options: &FlattenOptions) -> Result<FlatRecord> {
    let fields = match tree {
        EventTree::Node(fields) => fields,
        EventTree::Scalar(_) => {
            return Err(Error::MalformedTree(
                "record root is a scalar, expected a mapping".to_string(),
            ))
        }
    };

    let mut out = FlatRecord::new();
    flatten_node(fields, "", 1, options, &mut out)?;
    Ok(out)
}

fn flatten_node(
    fields: Vec<(String, EventTree)>,
    prefix: &str,
    depth: usize,
    options: &FlattenOptions,
    out: &mut FlatRecord,
) -> Result<()> {
    if depth > options.max_depth {
        return Err(Error::MalformedTree(format!(
            "nesting exceeds {} levels at '{}'",
            options.max_depth, prefix
        )));
    }

    for (name, child) in fields {
        let full_path = if prefix.is_empty() {
            name
        } else {
            format!("{}{}{}", prefix, PATH_SEPARATOR, name)
        };

        match child {
            EventTree::Node(children) => {
                flatten_node(children, &full_path, depth + 1, options, out)?;
            }
            EventTree::Scalar(scalar) => {
                let value = stringify(&scalar);
                if let Some(previous) = out.insert(full_path.clone(), value) {
                    debug!(
                        "Path '{}' produced twice in one record, dropping '{}'",
                        full_path, previous
                    );
                }
            }
        }
    }

    Ok(())
}

/// Natural textual form of a leaf. Missing values render as the empty string.
///
/// Floats use `Display`, which never switches to exponent notation:
/// `1e21` renders as `1000000000000000000000` and `1e-7` as `0.0000001`.
pub fn stringify(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Missing => String::new(),
        Scalar::Bool(b) => b.to_string(),
        Scalar::Integer(i) => i.to_string(),
        Scalar::Unsigned(u) => u.to_string(),
        Scalar::Float(f) => f.to_string(),
        Scalar::Text(s) => s.clone(),
        Scalar::List(items) => serde_json::to_string(items).unwrap_or_default(),
    }
}
