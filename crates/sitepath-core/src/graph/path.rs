use serde::{Deserialize, Serialize};
use sitepath_common::ResultRow;
use serde_json::Value;

/// One projected path: vertex maps at even positions, edge maps at odd positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    #[serde(default)]
    pub labels: Vec<Value>,
    pub objects: Vec<Value>,
}

impl PathResult {
    /// Reads a `path()` row. Rows without an `objects` array are not paths.
    pub fn from_row(row: &ResultRow) -> Option<Self> {
        let objects = row.get("objects")?.as_array()?.clone();
        let labels = row
            .get("labels")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Some(Self { labels, objects })
    }

    /// Parses every path row in a result set, skipping anything else.
    pub fn from_rows(rows: &[ResultRow]) -> Vec<Self> {
        rows.iter().filter_map(Self::from_row).collect()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Value> {
        self.objects.iter().step_by(2)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Value> {
        self.objects.iter().skip(1).step_by(2)
    }

    /// Number of edges crossed.
    pub fn hops(&self) -> usize {
        self.objects.len() / 2
    }

    /// First value of `key` on each vertex, e.g. the page names along the path.
    pub fn vertex_names(&self, key: &str) -> Vec<String> {
        self.vertices()
            .filter_map(|v| first_string(v.get(key)?))
            .collect()
    }
}

// valueMap() wraps every property in a list
fn first_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.first().and_then(first_string),
        _ => None,
    }
}
