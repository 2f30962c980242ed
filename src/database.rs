//! Database facade
//!
//! Owns one engine connection and one schema registry. Schema changes
//! hold the registry write lock across their engine statements, so the
//! registry and the physical tables never disagree; row operations share
//! a read lock.

use std::path::Path;

use parking_lot::RwLock;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::engine::SqliteEngine;
use crate::errors::{DbError, DbResult};
use crate::row::{RowManager, TableQuery};
use crate::schema::{LogicalType, SchemaRegistry, TableModel};
use crate::table::TableManager;
use crate::value::Row;

/// A schema-validated database handle
pub struct Database {
    config: DatabaseConfig,
    engine: SqliteEngine,
    registry: RwLock<SchemaRegistry>,
}

impl Database {
    /// Opens (or creates) a database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Self::with_config(DatabaseConfig::file(path))
    }

    /// Opens a fresh in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::with_config(DatabaseConfig::memory())
    }

    /// Opens a database with explicit configuration and reloads its table models.
    pub fn with_config(config: DatabaseConfig) -> DbResult<Self> {
        let engine = SqliteEngine::open(&config)?;
        let mut registry = SchemaRegistry::new();
        let loaded = TableManager::new(&engine, &mut registry).load()?;

        info!(path = %config.path, tables = loaded, "Database opened");
        Ok(Self {
            config,
            engine,
            registry: RwLock::new(registry),
        })
    }

    /// Returns the configuration this database was opened with
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Schema operations
    // ---------------------------------------------------------------------

    /// Creates a table from a model. See [`TableManager::create_table`].
    pub fn create_table(&self, model: TableModel) -> DbResult<()> {
        let mut registry = self.registry.write();
        TableManager::new(&self.engine, &mut registry).create_table(model)
    }

    /// Creates tables in order, stopping at the first failure.
    pub fn create_tables(&self, models: impl IntoIterator<Item = TableModel>) -> DbResult<()> {
        let mut registry = self.registry.write();
        TableManager::new(&self.engine, &mut registry).create_tables(models)
    }

    /// Drops a table and forgets its model.
    pub fn drop_table(&self, name: &str) -> DbResult<()> {
        let mut registry = self.registry.write();
        TableManager::new(&self.engine, &mut registry).drop_table(name)?;
        Ok(())
    }

    /// Returns a copy of a registered model
    pub fn table_model(&self, name: &str) -> Option<TableModel> {
        self.registry.read().lookup(name).cloned()
    }

    /// Returns registered table names in creation order
    pub fn table_names(&self) -> Vec<String> {
        self.registry.read().names()
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.registry.read().contains(name)
    }

    /// Returns every column of a table, identifier first, with its logical type.
    pub fn describe(&self, name: &str) -> DbResult<Vec<(String, LogicalType)>> {
        self.registry
            .read()
            .lookup(name)
            .map(TableModel::describe)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))
    }

    // ---------------------------------------------------------------------
    // Row operations
    // ---------------------------------------------------------------------

    /// Inserts a row, returning its identifier.
    pub fn insert_row(&self, table: &str, row: &Row) -> DbResult<i64> {
        let registry = self.registry.read();
        RowManager::new(&self.engine, &registry).insert_row(table, row)
    }

    /// Inserts rows in sequence; earlier rows stay if a later one fails.
    pub fn insert_rows(&self, table: &str, rows: &[Row]) -> DbResult<Vec<i64>> {
        let registry = self.registry.read();
        RowManager::new(&self.engine, &registry).insert_rows(table, rows)
    }

    /// Inserts `(table, row)` pairs in sequence; earlier rows stay if a later one fails.
    pub fn insert_rows_each<S: AsRef<str>>(&self, entries: &[(S, Row)]) -> DbResult<Vec<i64>> {
        let registry = self.registry.read();
        RowManager::new(&self.engine, &registry).insert_rows_each(entries)
    }

    /// Inserts all rows in one transaction, or none of them.
    pub fn insert_rows_atomic(&self, table: &str, rows: &[Row]) -> DbResult<Vec<i64>> {
        let registry = self.registry.read();
        RowManager::new(&self.engine, &registry).insert_rows_atomic(table, rows)
    }

    /// Reads rows with projection, sort and limit options.
    pub fn get_table(&self, table: &str, query: &TableQuery) -> DbResult<Vec<Row>> {
        let registry = self.registry.read();
        RowManager::new(&self.engine, &registry).get_table(table, query)
    }

    /// Reads every row and column, in identifier order.
    pub fn get_all(&self, table: &str) -> DbResult<Vec<Row>> {
        self.get_table(table, &TableQuery::default())
    }

    /// Deletes the row with the given identifier.
    pub fn delete_row_by_id(&self, table: &str, id: i64) -> DbResult<()> {
        let registry = self.registry.read();
        RowManager::new(&self.engine, &registry).delete_row_by_id(table, id)
    }

    /// Returns the number of rows in a table.
    pub fn count_rows(&self, table: &str) -> DbResult<i64> {
        let registry = self.registry.read();
        RowManager::new(&self.engine, &registry).count_rows(table)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("location", &self.engine.location())
            .field("tables", &self.table_names())
            .finish()
    }
}
