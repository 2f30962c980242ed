//! Logical to physical column type mapping
//!
//! | Logical | Physical | Stored as            |
//! |---------|----------|----------------------|
//! | boolean | INTEGER  | 0 / 1                |
//! | string  | TEXT     | UTF-8 text           |
//! | int     | INTEGER  | 64-bit integer       |
//! | real    | REAL     | 64-bit float         |
//! | date    | TEXT     | ISO-8601 text        |
//! | object  | TEXT     | JSON text            |
//! | array   | TEXT     | JSON text            |
//!
//! Unrecognised logical types map to TEXT.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Application-facing column type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogicalType {
    /// true / false
    Boolean,
    /// UTF-8 text
    String,
    /// Integral number
    Int,
    /// Floating-point number
    Real,
    /// Timestamp
    Date,
    /// Key/value mapping
    Object,
    /// Ordered sequence
    Array,
    /// A type name this version does not know. No value validates against it.
    Other(String),
}

impl LogicalType {
    /// Returns the type name used in schemas and error messages
    pub fn type_name(&self) -> &str {
        match self {
            LogicalType::Boolean => "boolean",
            LogicalType::String => "string",
            LogicalType::Int => "int",
            LogicalType::Real => "real",
            LogicalType::Date => "date",
            LogicalType::Object => "object",
            LogicalType::Array => "array",
            LogicalType::Other(name) => name,
        }
    }

    /// Returns the storage column type for this logical type
    pub fn physical_type(&self) -> PhysicalType {
        physical_type(self)
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for LogicalType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "boolean" => LogicalType::Boolean,
            "string" => LogicalType::String,
            "int" => LogicalType::Int,
            "real" => LogicalType::Real,
            "date" => LogicalType::Date,
            "object" => LogicalType::Object,
            "array" => LogicalType::Array,
            other => LogicalType::Other(other.to_string()),
        })
    }
}

impl From<String> for LogicalType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(ty) => ty,
            Err(never) => match never {},
        }
    }
}

impl From<LogicalType> for String {
    fn from(ty: LogicalType) -> Self {
        ty.type_name().to_string()
    }
}

/// Engine-native column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalType {
    Integer,
    Real,
    Text,
}

impl PhysicalType {
    /// Returns the SQL type keyword
    pub fn sql_type(self) -> &'static str {
        match self {
            PhysicalType::Integer => "INTEGER",
            PhysicalType::Real => "REAL",
            PhysicalType::Text => "TEXT",
        }
    }
}

impl fmt::Display for PhysicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_type())
    }
}

/// Maps a logical type to its storage type. Total and deterministic.
pub fn physical_type(logical: &LogicalType) -> PhysicalType {
    match logical {
        LogicalType::Boolean | LogicalType::Int => PhysicalType::Integer,
        LogicalType::Real => PhysicalType::Real,
        LogicalType::String
        | LogicalType::Date
        | LogicalType::Object
        | LogicalType::Array
        | LogicalType::Other(_) => PhysicalType::Text,
    }
}

/// Maps a storage type back to the logical type it natively holds.
///
/// Used for columns without a declared model, such as the row identifier.
pub fn logical_for_physical(physical: PhysicalType) -> LogicalType {
    match physical {
        PhysicalType::Integer => LogicalType::Int,
        PhysicalType::Real => LogicalType::Real,
        PhysicalType::Text => LogicalType::String,
    }
}
