//! Row validation against a table model
//!
//! Validation semantics:
//! - Absent (or null) values are valid only for optional columns
//! - boolean, string, date, object and array require the matching variant
//! - int accepts integers and integral reals within the i64 range; any other real is reported as "real"
//! - real accepts integers and finite reals
//! - Unrecognised declared types reject every present value
//!
//! Undeclared keys in the row are not validated; insert never writes them.

use super::mapper::LogicalType;
use super::types::{ColumnModel, TableModel};
use crate::errors::{DbError, DbResult};
use crate::value::{Row, Value};

/// Checks rows against table models.
///
/// Validation runs before any statement is sent to the engine and never
/// mutates the row.
pub struct RowValidator;

impl RowValidator {
    /// Returns true if `value` is acceptable for `column`.
    ///
    /// `None` and `Some(Value::Null)` both mean the value is absent.
    pub fn validate(column: &ColumnModel, value: Option<&Value>) -> bool {
        Self::check_column("", column, value).is_ok()
    }

    /// Validates one column value, producing the diagnostic on failure.
    pub fn check_column(table: &str, column: &ColumnModel, value: Option<&Value>) -> DbResult<()> {
        let value = match value {
            None | Some(Value::Null) => {
                if column.required {
                    return Err(DbError::MissingRequiredColumn {
                        table: table.to_string(),
                        column: column.name.clone(),
                    });
                }
                return Ok(());
            }
            Some(value) => value,
        };

        if matches_type(&column.column_type, value) {
            Ok(())
        } else {
            Err(DbError::InvalidColumnType {
                table: table.to_string(),
                column: column.name.clone(),
                expected: column.column_type.to_string(),
                actual: value.kind_name().to_string(),
            })
        }
    }

    /// Validates a whole row. The first failing column, in declaration order, aborts.
    pub fn validate_row(model: &TableModel, row: &Row) -> DbResult<()> {
        for column in &model.columns {
            Self::check_column(&model.name, column, lookup(row, &column.name))?;
        }
        Ok(())
    }
}

/// Finds a row value by column name, exact match first.
pub(crate) fn lookup<'r>(row: &'r Row, name: &str) -> Option<&'r Value> {
    row.get(name).or_else(|| {
        row.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

// i64::MAX is not representable as f64; 2^63 is the first value past it.
const I64_LOWER: f64 = i64::MIN as f64;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

fn matches_type(expected: &LogicalType, value: &Value) -> bool {
    match expected {
        LogicalType::Boolean => matches!(value, Value::Bool(_)),
        LogicalType::String => matches!(value, Value::Text(_)),
        LogicalType::Int => match value {
            Value::Integer(_) => true,
            Value::Real(f) => f.fract() == 0.0 && (I64_LOWER..I64_UPPER).contains(f),
            _ => false,
        },
        LogicalType::Real => match value {
            Value::Integer(_) => true,
            Value::Real(f) => f.is_finite(),
            _ => false,
        },
        LogicalType::Date => matches!(value, Value::Timestamp(_)),
        LogicalType::Object => matches!(value, Value::Object(_)),
        LogicalType::Array => matches!(value, Value::Array(_)),
        LogicalType::Other(_) => false,
    }
}
