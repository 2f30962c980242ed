//! Schema subsystem for schemadb
//!
//! Table models are declared at runtime and enforced at write time.
//!
//! # Design Principles
//!
//! - One registry per database handle, no global state
//! - Models are immutable once registered
//! - Validation happens before any statement reaches the engine
//! - The row identifier is implicit and never declared

mod mapper;
mod registry;
mod types;
mod validator;

pub use mapper::{logical_for_physical, physical_type, LogicalType, PhysicalType};
pub use registry::SchemaRegistry;
pub use types::{ColumnModel, TableModel, ID_COLUMN};
pub use validator::RowValidator;

pub(crate) use validator::lookup as lookup_value;
