// Path Query Builder - emits Gremlin text for page-to-page navigation paths
// The template is fixed; only the slots below vary

use super::GraphError;
use serde_json::{Map, Value};

pub const DEFAULT_VERTEX_LABEL: &str = "webpages";
pub const DEFAULT_EDGE_LABEL: &str = "button";
pub const DEFAULT_EDGE_KEYS: [&str; 2] = ["subLabel", "label"];

const START_BINDING: &str = "startPage";
const GOAL_BINDING: &str = "goalPage";

/// An immutable Gremlin query plus the bindings it refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalQuery {
    gremlin: String,
    bindings: Map<String, Value>,
}

impl TraversalQuery {
    /// Wraps raw Gremlin text with no bindings.
    pub fn raw(gremlin: impl Into<String>) -> Self {
        Self {
            gremlin: gremlin.into(),
            bindings: Map::new(),
        }
    }

    pub fn gremlin(&self) -> &str {
        &self.gremlin
    }

    pub fn bindings(&self) -> &Map<String, Value> {
        &self.bindings
    }
}

impl std::fmt::Display for TraversalQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.gremlin)
    }
}

/// Builds the path query with the default site-graph layout.
///
/// Walks `button` edges in either direction from the start page until the goal
/// page is reached and projects the first path found.
pub fn generate_query(start_page: &str, goal_page: &str) -> Result<TraversalQuery, GraphError> {
    PathQueryBuilder::new(start_page, goal_page).build()
}

/// Configures the slots of the path template.
#[derive(Debug, Clone)]
pub struct PathQueryBuilder {
    start_page: String,
    goal_page: String,
    vertex_label: String,
    property_key: String,
    edge_label: String,
    edge_keys: Vec<String>,
    limit: usize,
    bind_parameters: bool,
}

impl PathQueryBuilder {
    pub fn new(start_page: impl Into<String>, goal_page: impl Into<String>) -> Self {
        Self {
            start_page: start_page.into(),
            goal_page: goal_page.into(),
            vertex_label: DEFAULT_VERTEX_LABEL.to_string(),
            property_key: DEFAULT_VERTEX_LABEL.to_string(),
            edge_label: DEFAULT_EDGE_LABEL.to_string(),
            edge_keys: DEFAULT_EDGE_KEYS.iter().map(|k| k.to_string()).collect(),
            limit: 1,
            bind_parameters: false,
        }
    }

    /// Sets the vertex label; the identifying property shares the label's name
    /// unless overridden with [`property_key`](Self::property_key).
    pub fn vertex_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.property_key = label.clone();
        self.vertex_label = label;
        self
    }

    pub fn property_key(mut self, key: impl Into<String>) -> Self {
        self.property_key = key.into();
        self
    }

    pub fn edge_label(mut self, label: impl Into<String>) -> Self {
        self.edge_label = label.into();
        self
    }

    pub fn edge_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edge_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = n;
        self
    }

    /// Send page names as request bindings rather than string literals.
    pub fn bind_parameters(mut self, enabled: bool) -> Self {
        self.bind_parameters = enabled;
        self
    }

    pub fn build(self) -> Result<TraversalQuery, GraphError> {
        require_identifier("start page", &self.start_page)?;
        require_identifier("goal page", &self.goal_page)?;
        require_identifier("vertex label", &self.vertex_label)?;
        require_identifier("property key", &self.property_key)?;
        require_identifier("edge label", &self.edge_label)?;
        if self.limit == 0 {
            return Err(GraphError::InvalidInput("limit must be at least 1".into()));
        }

        let mut bindings = Map::new();
        let (start, goal) = if self.bind_parameters {
            bindings.insert(START_BINDING.to_string(), Value::String(self.start_page.clone()));
            bindings.insert(GOAL_BINDING.to_string(), Value::String(self.goal_page.clone()));
            (START_BINDING.to_string(), GOAL_BINDING.to_string())
        } else {
            (quote(&self.start_page), quote(&self.goal_page))
        };

        let label = quote(&self.vertex_label);
        let key = quote(&self.property_key);
        let edge = quote(&self.edge_label);
        let edge_keys = self
            .edge_keys
            .iter()
            .map(|k| quote(k))
            .collect::<Vec<_>>()
            .join(", ");

        let gremlin = format!(
            "g.V().hasLabel({label}).has({key}, {start})\n\
             .repeat(bothE({edge}).otherV())\n\
             .until(hasLabel({label}).has({key}, {goal}))\n\
             .path().by(valueMap({key})).by(valueMap({edge_keys}))\n\
             .limit({limit})",
            limit = self.limit,
        );

        Ok(TraversalQuery { gremlin, bindings })
    }
}

fn require_identifier(what: &str, value: &str) -> Result<(), GraphError> {
    if value.trim().is_empty() {
        return Err(GraphError::InvalidInput(format!("{} must not be empty", what)));
    }
    Ok(())
}

/// Single-quoted Gremlin string literal.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}
