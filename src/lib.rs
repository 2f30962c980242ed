//! schemadb - A schema-validated table layer over an embedded SQLite store
//!
//! Declare table models at runtime, create the matching tables, and insert
//! and read typed rows. Values are validated against the declared column
//! types before any statement runs, and round-trip through the store's
//! text/integer/real columns (JSON for objects and arrays, ISO-8601 for dates).
//!
//! ```no_run
//! use schemadb::{ColumnModel, Database, Row, TableModel, Value};
//!
//! let db = Database::open_in_memory()?;
//! db.create_table(TableModel::new(
//!     "users",
//!     vec![ColumnModel::string("email").required(), ColumnModel::int("age")],
//! ))?;
//!
//! let mut row = Row::new();
//! row.insert("email".into(), Value::from("a@b.com"));
//! row.insert("age".into(), Value::from(30));
//! let id = db.insert_row("users", &row)?;
//!
//! let rows = db.get_all("users")?;
//! assert_eq!(rows[0]["id"], Value::Integer(id));
//! # Ok::<(), schemadb::DbError>(())
//! ```

pub mod codec;
pub mod config;
pub mod database;
pub mod engine;
pub mod errors;
pub mod row;
pub mod schema;
pub mod table;
pub mod value;

pub use codec::ValueCodec;
pub use config::DatabaseConfig;
pub use database::Database;
pub use errors::{DbError, DbResult};
pub use row::{SortDirection, SortSpec, TableQuery};
pub use schema::{ColumnModel, LogicalType, PhysicalType, TableModel, ID_COLUMN};
pub use value::{Row, Value};
