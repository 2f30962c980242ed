//! Table and column model definitions
//!
//! A table model is a name plus an ordered list of columns. The row
//! identifier column is added when the table is created and is never
//! declared by callers.

use serde::{Deserialize, Serialize};

use super::mapper::LogicalType;
use crate::errors::{DbError, DbResult};

/// Name of the engine-assigned row identifier column
pub const ID_COLUMN: &str = "id";

/// Column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnModel {
    /// Column name, unique within its table
    pub name: String,
    /// Declared logical type
    #[serde(rename = "type")]
    pub column_type: LogicalType,
    /// Whether every row must carry a value
    #[serde(default)]
    pub required: bool,
}

impl ColumnModel {
    /// Create an optional column
    pub fn new(name: impl Into<String>, column_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            column_type,
            required: false,
        }
    }

    /// Mark the column as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, LogicalType::Boolean)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, LogicalType::String)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, LogicalType::Int)
    }

    pub fn real(name: impl Into<String>) -> Self {
        Self::new(name, LogicalType::Real)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, LogicalType::Date)
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::new(name, LogicalType::Object)
    }

    pub fn array(name: impl Into<String>) -> Self {
        Self::new(name, LogicalType::Array)
    }

    /// Returns true if this column carries the given name.
    ///
    /// Identifiers compare ASCII case-insensitively, as the engine does.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Table definition held in the schema registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableModel {
    /// Table name, unique within the registry
    pub name: String,
    /// Declared columns in order
    pub columns: Vec<ColumnModel>,
}

impl TableModel {
    /// Create a new table model
    pub fn new(name: impl Into<String>, columns: Vec<ColumnModel>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Append a column
    pub fn with_column(mut self, column: ColumnModel) -> Self {
        self.columns.push(column);
        self
    }

    /// Finds a declared column by name
    pub fn column(&self, name: &str) -> Option<&ColumnModel> {
        self.columns.iter().find(|c| c.is_named(name))
    }

    /// Returns true if the column is declared
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Returns declared column names in order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Returns every column of the physical table, identifier first, with its logical type.
    pub fn describe(&self) -> Vec<(String, LogicalType)> {
        std::iter::once((ID_COLUMN.to_string(), LogicalType::Int))
            .chain(
                self.columns
                    .iter()
                    .map(|c| (c.name.clone(), c.column_type.clone())),
            )
            .collect()
    }

    /// Renders the column listing used in diagnostics, e.g. `id (int), email (string)`.
    pub fn column_listing(&self) -> String {
        self.describe()
            .iter()
            .map(|(name, ty)| format!("{} ({})", name, ty))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Validates the model itself (not a row).
    ///
    /// Rejects columns named like the identifier and duplicate column names.
    pub fn validate_structure(&self) -> DbResult<()> {
        for (i, column) in self.columns.iter().enumerate() {
            if column.is_named(ID_COLUMN) {
                return Err(DbError::ReservedColumnName {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }

            if self.columns[..i].iter().any(|c| c.is_named(&column.name)) {
                return Err(DbError::DuplicateColumnName {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }
        }

        Ok(())
    }
}
