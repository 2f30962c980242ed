//! Value encoding and decoding between row values and storage primitives
//!
//! Encode (insert):
//! - absent → NULL
//! - object / array → JSON text
//! - date → ISO-8601 text, nanosecond precision
//! - int → integer, fractional part floored away
//! - boolean → 0 / 1, string → text, real → float
//!
//! Decode (read):
//! - NULL → [`Value::Null`]
//! - object / array → parsed JSON
//! - int / real → number
//! - boolean → truthiness of the stored primitive
//! - date → parsed ISO-8601 text (or epoch milliseconds)
//! - columns without a model (the row identifier) → passed through

use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use serde_json::Value as JsonValue;

use crate::errors::{DbError, DbResult};
use crate::schema::{lookup_value, ColumnModel, LogicalType, TableModel};
use crate::value::{format_timestamp, Row, Value};

/// Converts between [`Value`] and engine parameters/results
pub struct ValueCodec;

impl ValueCodec {
    /// Encodes one column value into a bindable parameter.
    pub fn encode(column: &ColumnModel, value: Option<&Value>) -> DbResult<SqlValue> {
        let value = match value {
            None | Some(Value::Null) => return Ok(SqlValue::Null),
            Some(value) => value,
        };

        match (&column.column_type, value) {
            (LogicalType::Int, Value::Real(f)) => Ok(SqlValue::Integer(f.floor() as i64)),
            (_, value) => encode_native(&column.name, value),
        }
    }

    /// Encodes every declared column of the model, in declaration order.
    ///
    /// Absent columns become NULL; undeclared keys are dropped.
    pub fn encode_row(model: &TableModel, row: &Row) -> DbResult<Vec<SqlValue>> {
        model
            .columns
            .iter()
            .map(|column| Self::encode(column, lookup_value(row, &column.name)))
            .collect()
    }

    /// Decodes one stored primitive according to the column's declared type.
    pub fn decode(column: &ColumnModel, stored: SqlValue) -> DbResult<Value> {
        if let SqlValue::Null = stored {
            return Ok(Value::Null);
        }

        let name = column.name.as_str();
        match &column.column_type {
            LogicalType::Boolean => decode_bool(name, stored),
            LogicalType::Int => decode_int(name, stored),
            LogicalType::Real => decode_real(name, stored),
            LogicalType::Date => decode_date(name, stored),
            LogicalType::Object => match parse_json(name, stored)? {
                JsonValue::Object(m) => Ok(Value::Object(m)),
                other => Err(DbError::codec(
                    name,
                    format!("stored JSON is not an object: {}", other),
                )),
            },
            LogicalType::Array => match parse_json(name, stored)? {
                JsonValue::Array(v) => Ok(Value::Array(v)),
                other => Err(DbError::codec(
                    name,
                    format!("stored JSON is not an array: {}", other),
                )),
            },
            LogicalType::String | LogicalType::Other(_) => passthrough(name, stored),
        }
    }

    /// Decodes a result row. Columns not declared on the model are left as stored.
    pub fn decode_row(model: &TableModel, stored: Vec<(String, SqlValue)>) -> DbResult<Row> {
        stored
            .into_iter()
            .map(|(name, raw)| {
                let value = match model.column(&name) {
                    Some(column) => Self::decode(column, raw)?,
                    None => passthrough(&name, raw)?,
                };
                Ok((name, value))
            })
            .collect()
    }
}

fn encode_native(column: &str, value: &Value) -> DbResult<SqlValue> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Integer(n) => SqlValue::Integer(*n),
        Value::Real(f) => SqlValue::Real(*f),
        Value::Timestamp(t) => SqlValue::Text(format_timestamp(t)),
        Value::Object(m) => SqlValue::Text(to_json_text(column, m)?),
        Value::Array(v) => SqlValue::Text(to_json_text(column, v)?),
    })
}

fn to_json_text<T: serde::Serialize>(column: &str, value: &T) -> DbResult<String> {
    serde_json::to_string(value)
        .map_err(|e| DbError::codec(column, format!("failed to serialize JSON: {}", e)))
}

/// Maps a stored primitive onto the value variant that holds it natively.
fn passthrough(column: &str, stored: SqlValue) -> DbResult<Value> {
    match stored {
        SqlValue::Null => Ok(Value::Null),
        SqlValue::Integer(n) => Ok(Value::Integer(n)),
        SqlValue::Real(f) => Ok(Value::Real(f)),
        SqlValue::Text(s) => Ok(Value::Text(s)),
        SqlValue::Blob(b) => Err(DbError::codec(
            column,
            format!("unsupported blob value ({} bytes)", b.len()),
        )),
    }
}

fn decode_bool(column: &str, stored: SqlValue) -> DbResult<Value> {
    let b = match stored {
        SqlValue::Integer(n) => n != 0,
        SqlValue::Real(f) => f != 0.0,
        SqlValue::Text(s) => {
            let s = s.trim();
            !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false"))
        }
        other => return passthrough(column, other),
    };
    Ok(Value::Bool(b))
}

fn decode_int(column: &str, stored: SqlValue) -> DbResult<Value> {
    match stored {
        SqlValue::Real(f) if f.fract() == 0.0 => Ok(Value::Integer(f as i64)),
        SqlValue::Text(s) => parse_number(column, &s),
        other => passthrough(column, other),
    }
}

fn decode_real(column: &str, stored: SqlValue) -> DbResult<Value> {
    match stored {
        SqlValue::Integer(n) => Ok(Value::Real(n as f64)),
        SqlValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Real)
            .map_err(|e| DbError::codec(column, format!("'{}' is not a number: {}", s, e))),
        other => passthrough(column, other),
    }
}

fn parse_number(column: &str, text: &str) -> DbResult<Value> {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Ok(Value::Integer(n));
    }
    text.parse::<f64>()
        .map(Value::Real)
        .map_err(|e| DbError::codec(column, format!("'{}' is not a number: {}", text, e)))
}

fn decode_date(column: &str, stored: SqlValue) -> DbResult<Value> {
    match stored {
        SqlValue::Text(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|t| Value::Timestamp(t.with_timezone(&Utc)))
            .map_err(|e| DbError::codec(column, format!("'{}' is not an ISO-8601 date: {}", s, e))),
        SqlValue::Integer(ms) => DateTime::<Utc>::from_timestamp_millis(ms)
            .map(Value::Timestamp)
            .ok_or_else(|| DbError::codec(column, format!("timestamp {} out of range", ms))),
        other => passthrough(column, other),
    }
}

fn parse_json(column: &str, stored: SqlValue) -> DbResult<JsonValue> {
    match stored {
        SqlValue::Text(s) => serde_json::from_str(&s)
            .map_err(|e| DbError::codec(column, format!("invalid stored JSON: {}", e))),
        other => Err(DbError::codec(
            column,
            format!("expected JSON text, found {:?}", other.data_type()),
        )),
    }
}
