//! Tagged row values
//!
//! Row data is a mapping from column name to [`Value`]. Validation and
//! encoding match on the variant rather than inspecting runtime types.

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};

/// A row: column name to value, in column order
pub type Row = IndexMap<String, Value>;

/// A single column value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value
    Null,
    Bool(bool),
    Text(String),
    Integer(i64),
    Real(f64),
    Timestamp(DateTime<Utc>),
    /// Key/value mapping
    Object(Map<String, JsonValue>),
    /// Ordered sequence
    Array(Vec<JsonValue>),
}

impl Value {
    /// Returns the kind name used in type mismatch diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Text(_) => "string",
            Value::Integer(_) => "int",
            Value::Real(_) => "real",
            Value::Timestamp(_) => "date",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as a float for either numeric variant
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Real(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map<String, JsonValue>> {
        match self {
            Value::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Converts to JSON. Timestamps render as ISO-8601 text.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Text(s) => JsonValue::String(s.clone()),
            Value::Integer(n) => JsonValue::from(*n),
            Value::Real(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Timestamp(t) => JsonValue::String(format_timestamp(t)),
            Value::Object(m) => JsonValue::Object(m.clone()),
            Value::Array(v) => JsonValue::Array(v.clone()),
        }
    }
}

/// Formats a timestamp as ISO-8601 with nanosecond precision, e.g. `2024-05-01T12:00:00.000000000Z`.
///
/// The fraction is fixed-width so stored dates sort correctly as text.
pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Real(f)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// JSON strings stay text; they are not parsed as timestamps.
impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Real(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Value::Text(s),
            JsonValue::Array(v) => Value::Array(v),
            JsonValue::Object(m) => Value::Object(m),
        }
    }
}

/// Builds a [`Row`] from a JSON object. Non-object input yields an empty row.
pub fn row_from_json(json: JsonValue) -> Row {
    match json {
        JsonValue::Object(m) => m.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
        _ => Row::new(),
    }
}

/// Renders a [`Row`] as a JSON object
pub fn row_to_json(row: &Row) -> JsonValue {
    JsonValue::Object(row.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
}
