//! Error types for schemadb
//!
//! Error codes:
//! - RESERVED_COLUMN_NAME (validation)
//! - RESERVED_TABLE_NAME (validation)
//! - TABLE_ALREADY_EXISTS (validation)
//! - TABLE_NOT_FOUND (validation)
//! - DUPLICATE_COLUMN_NAME (validation)
//! - MISSING_REQUIRED_COLUMN (validation)
//! - INVALID_COLUMN_TYPE (validation)
//! - UNKNOWN_COLUMN (validation)
//! - INVALID_LIMIT (validation)
//! - ROW_NOT_FOUND
//! - CODEC_ERROR
//! - CONFIG_ERROR
//! - ENGINE_ERROR

use thiserror::Error;

/// Result type for all database operations
pub type DbResult<T> = Result<T, DbError>;

/// Errors returned by every public operation
#[derive(Debug, Error)]
pub enum DbError {
    /// A declared column uses the name of the row identifier
    #[error("Column '{column}' on table '{table}' uses the reserved identifier name")]
    ReservedColumnName { table: String, column: String },

    /// The table name is used internally by the database
    #[error("Table name '{0}' is reserved")]
    ReservedTableName(String),

    /// A table with this name is already registered
    #[error("Table '{0}' already exists")]
    TableAlreadyExists(String),

    /// No table with this name is registered
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    /// Two columns in one table model share a name
    #[error("Duplicate column '{column}' on table '{table}'")]
    DuplicateColumnName { table: String, column: String },

    /// A required column is absent from the row
    #[error("Missing required column '{column}' on table '{table}'")]
    MissingRequiredColumn { table: String, column: String },

    /// A value does not match the column's declared type
    #[error("Column '{column}' on table '{table}': expected {expected}, got {actual}")]
    InvalidColumnType {
        table: String,
        column: String,
        expected: String,
        actual: String,
    },

    /// A requested projection or sort column is not declared
    #[error(
        "Unknown column(s) {} on table '{table}'. Available columns: {available}",
        quote_list(.columns)
    )]
    UnknownColumn {
        table: String,
        columns: Vec<String>,
        available: String,
    },

    /// Limit below one
    #[error("Invalid limit {0}: limit must be at least 1")]
    InvalidLimit(i64),

    /// Delete targets an identifier with no row
    #[error("Row with id {id} not found in table '{table}'")]
    RowNotFound { table: String, id: i64 },

    /// A value could not be encoded for, or decoded from, storage
    #[error("Column '{column}': {reason}")]
    Codec { column: String, reason: String },

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure reported by the storage engine
    #[error("Engine error: {0}")]
    Engine(#[from] rusqlite::Error),
}

impl DbError {
    /// Returns the stable string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            DbError::ReservedColumnName { .. } => "RESERVED_COLUMN_NAME",
            DbError::ReservedTableName(_) => "RESERVED_TABLE_NAME",
            DbError::TableAlreadyExists(_) => "TABLE_ALREADY_EXISTS",
            DbError::TableNotFound(_) => "TABLE_NOT_FOUND",
            DbError::DuplicateColumnName { .. } => "DUPLICATE_COLUMN_NAME",
            DbError::MissingRequiredColumn { .. } => "MISSING_REQUIRED_COLUMN",
            DbError::InvalidColumnType { .. } => "INVALID_COLUMN_TYPE",
            DbError::UnknownColumn { .. } => "UNKNOWN_COLUMN",
            DbError::InvalidLimit(_) => "INVALID_LIMIT",
            DbError::RowNotFound { .. } => "ROW_NOT_FOUND",
            DbError::Codec { .. } => "CODEC_ERROR",
            DbError::Config(_) => "CONFIG_ERROR",
            DbError::Engine(_) => "ENGINE_ERROR",
        }
    }

    /// Returns true if the error was raised before any statement reached the engine
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            DbError::RowNotFound { .. }
                | DbError::Codec { .. }
                | DbError::Config(_)
                | DbError::Engine(_)
        )
    }

    pub(crate) fn codec(column: impl Into<String>, reason: impl Into<String>) -> Self {
        DbError::Codec {
            column: column.into(),
            reason: reason.into(),
        }
    }
}

fn quote_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("'{}'", c))
        .collect::<Vec<_>>()
        .join(", ")
}
