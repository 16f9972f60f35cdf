// Gremlin Server message framing (GraphSON over WebSocket)

use crate::graph::{GraphError, TraversalQuery};
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

pub const STATUS_SUCCESS: u16 = 200;
pub const STATUS_NO_CONTENT: u16 = 204;
pub const STATUS_PARTIAL_CONTENT: u16 = 206;
pub const STATUS_UNAUTHORIZED: u16 = 401;
pub const STATUS_AUTHENTICATE: u16 = 407;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMessage {
    pub request_id: Uuid,
    pub op: String,
    pub processor: String,
    pub args: Value,
}

impl RequestMessage {
    pub fn eval(request_id: Uuid, query: &TraversalQuery) -> Self {
        Self {
            request_id,
            op: "eval".to_string(),
            processor: String::new(),
            args: json!({
                "gremlin": query.gremlin(),
                "bindings": query.bindings(),
                "language": "gremlin-groovy",
            }),
        }
    }

    /// SASL PLAIN answer to a 407 challenge for `request_id`.
    pub fn authentication(request_id: Uuid, username: &str, password: &str) -> Self {
        Self {
            request_id,
            op: "authentication".to_string(),
            processor: String::new(),
            args: json!({
                "sasl": sasl_plain(username, password),
                "saslMechanism": "PLAIN",
            }),
        }
    }

    /// Binary frame: mime length byte, mime type, JSON body.
    pub fn encode(&self, mime_type: &str) -> Result<Vec<u8>, GraphError> {
        let mime_len = u8::try_from(mime_type.len())
            .map_err(|_| GraphError::Configuration(format!("mime type too long: {}", mime_type)))?;
        let body = serde_json::to_vec(self)
            .map_err(|e| GraphError::Protocol(format!("Failed to encode request: {}", e)))?;

        let mut frame = Vec::with_capacity(1 + mime_type.len() + body.len());
        frame.push(mime_len);
        frame.extend_from_slice(mime_type.as_bytes());
        frame.extend_from_slice(&body);
        Ok(frame)
    }
}

pub fn sasl_plain(username: &str, password: &str) -> String {
    let token = format!("\0{}\0{}", username, password);
    base64::engine::general_purpose::STANDARD.encode(token)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMessage {
    /// Absent on some server-side errors
    #[serde(default)]
    pub request_id: Option<Uuid>,
    pub status: ResponseStatus,
    #[serde(default)]
    pub result: ResponseResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseStatus {
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub attributes: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseResult {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub meta: Value,
}

impl ResponseMessage {
    pub fn decode(bytes: &[u8]) -> Result<Self, GraphError> {
        serde_json::from_slice(bytes).map_err(|e| {
            GraphError::Protocol(format!(
                "Failed to parse response: {} - body: {}",
                e,
                String::from_utf8_lossy(bytes)
            ))
        })
    }

    /// Result rows with GraphSON type wrappers removed.
    pub fn rows(&self) -> Vec<Value> {
        match untype(self.result.data.clone()) {
            Value::Null => Vec::new(),
            Value::Array(items) => items,
            other => vec![other],
        }
    }
}

/// Strips GraphSON 2/3 `{"@type", "@value"}` wrappers, recursively.
pub fn untype(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.len() == 2 && map.contains_key("@type") && map.contains_key("@value") => {
            let kind = map.remove("@type").unwrap_or_default();
            let inner = map.remove("@value").unwrap_or_default();
            match (kind.as_str(), inner) {
                (Some("g:Map"), Value::Array(pairs)) => untype_map(pairs),
                (_, inner) => untype(inner),
            }
        }
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, untype(v))).collect()),
        Value::Array(items) => Value::Array(items.into_iter().map(untype).collect()),
        other => other,
    }
}

// g:Map is a flat [k1, v1, k2, v2, ...] list
fn untype_map(pairs: Vec<Value>) -> Value {
    let mut map = Map::new();
    let mut iter = pairs.into_iter();
    while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
        let key = match untype(k) {
            Value::String(s) => s,
            other => other.to_string(),
        };
        map.insert(key, untype(v));
    }
    Value::Object(map)
}
