use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Parsed body of an admin API response.
///
/// The variant is chosen from the response `content-type` header: JSON media
/// types parse into [`ResponseBody::Json`], everything else is kept as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResponseBody {
    Json(Value),
    Text(String),
    Empty,
}

impl ResponseBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, ResponseBody::Empty)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Convert into a JSON value suitable for structured tool output.
    ///
    /// Text bodies are wrapped as `{"content": "..."}` and empty bodies become
    /// an empty object so callers always receive an object or array.
    pub fn into_json(self) -> Value {
        match self {
            ResponseBody::Json(value) => value,
            ResponseBody::Text(text) => json!({ "content": text }),
            ResponseBody::Empty => Value::Object(Map::new()),
        }
    }
}
