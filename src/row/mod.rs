//! Row operations
//!
//! Insert, read and delete rows in registered tables.

mod manager;
mod query;

pub use manager::{insert_sql, select_sql, RowManager};
pub use query::{SortDirection, SortSpec, TableQuery};
