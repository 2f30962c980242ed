//! Table manager: CREATE / DROP against the engine
//!
//! The registry and the physical tables change together:
//! - a model is registered only after its CREATE statement succeeds
//! - a model is evicted only after its DROP statement succeeds
//!
//! Each model is also recorded in an internal metadata table inside the
//! same engine transaction, so a file database reloads its registry on open.

use rusqlite::types::Value as SqlValue;
use tracing::{debug, info, instrument, warn};

use crate::engine::{quote_ident, SqliteEngine};
use crate::errors::{DbError, DbResult};
use crate::schema::{SchemaRegistry, TableModel, ID_COLUMN};

/// Internal table holding one JSON-encoded model per user table
pub const META_TABLE: &str = "_schemadb_tables";

/// Creates and drops tables, keeping the registry in step
pub struct TableManager<'a> {
    engine: &'a SqliteEngine,
    registry: &'a mut SchemaRegistry,
}

impl<'a> TableManager<'a> {
    pub fn new(engine: &'a SqliteEngine, registry: &'a mut SchemaRegistry) -> Self {
        Self { engine, registry }
    }

    /// Creates the metadata table if needed and registers every recorded model.
    ///
    /// Returns the number of models loaded. Records whose physical table is
    /// missing are skipped.
    pub fn load(&mut self) -> DbResult<usize> {
        let records = self.engine.with_session(|s| {
            s.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {} (name TEXT PRIMARY KEY COLLATE NOCASE, model TEXT NOT NULL)",
                    quote_ident(META_TABLE)
                ),
                &[],
            )?;

            let rows = s.query(
                &format!("SELECT name, model FROM {} ORDER BY rowid", quote_ident(META_TABLE)),
                &[],
            )?;

            let mut records = Vec::with_capacity(rows.len());
            for row in rows {
                let mut fields = row.into_iter().map(|(_, v)| v);
                let (Some(SqlValue::Text(name)), Some(SqlValue::Text(model))) =
                    (fields.next(), fields.next())
                else {
                    return Err(DbError::codec(META_TABLE, "malformed metadata record"));
                };
                let exists = s.table_exists(&name)?;
                records.push((name, model, exists));
            }
            Ok(records)
        })?;

        let mut loaded = 0;
        for (name, model_json, exists) in records {
            if !exists {
                warn!(table = %name, "Skipping metadata for missing table");
                continue;
            }

            let model: TableModel = serde_json::from_str(&model_json).map_err(|e| {
                DbError::codec(META_TABLE, format!("invalid model for '{}': {}", name, e))
            })?;
            self.registry.register(model)?;
            loaded += 1;
        }

        debug!(loaded, "Loaded table models");
        Ok(loaded)
    }

    /// Creates a physical table for the model and registers it.
    ///
    /// # Errors
    ///
    /// Fails before touching the engine with `TableAlreadyExists`,
    /// `ReservedTableName`, `ReservedColumnName` or `DuplicateColumnName`.
    /// Fails with `Engine` if the CREATE statement fails.
    #[instrument(skip_all, fields(table = %model.name))]
    pub fn create_table(&mut self, model: TableModel) -> DbResult<()> {
        if self.registry.contains(&model.name) {
            return Err(DbError::TableAlreadyExists(model.name));
        }
        if model.name.eq_ignore_ascii_case(META_TABLE) {
            return Err(DbError::ReservedTableName(model.name));
        }
        model.validate_structure()?;

        let create_sql = create_table_sql(&model);
        let model_json = serde_json::to_string(&model)
            .map_err(|e| DbError::codec(META_TABLE, format!("failed to serialize model: {}", e)))?;

        debug!("CREATE TABLE SQL: {}", create_sql);
        self.engine.transaction(|s| {
            s.execute(&create_sql, &[])?;
            s.execute(
                &format!(
                    "INSERT OR REPLACE INTO {} (name, model) VALUES (?1, ?2)",
                    quote_ident(META_TABLE)
                ),
                &[SqlValue::Text(model.name.clone()), SqlValue::Text(model_json)],
            )?;
            Ok(())
        })?;

        info!(columns = model.columns.len(), "Created table");
        self.registry.register(model)
    }

    /// Creates each model in order. The first failure stops the batch;
    /// tables created before it are kept.
    pub fn create_tables(&mut self, models: impl IntoIterator<Item = TableModel>) -> DbResult<()> {
        for model in models {
            self.create_table(model)?;
        }
        Ok(())
    }

    /// Drops the physical table and evicts its model.
    ///
    /// Returns the evicted model.
    #[instrument(skip_all, fields(table = %name))]
    pub fn drop_table(&mut self, name: &str) -> DbResult<TableModel> {
        let model = self
            .registry
            .lookup(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))?;

        let drop_sql = format!("DROP TABLE IF EXISTS {}", quote_ident(&model.name));
        let table_name = model.name.clone();

        self.engine.transaction(|s| {
            s.execute(&drop_sql, &[])?;
            s.execute(
                &format!("DELETE FROM {} WHERE name = ?1", quote_ident(META_TABLE)),
                &[SqlValue::Text(table_name.clone())],
            )?;
            Ok(())
        })?;

        info!("Dropped table");
        self.registry
            .unregister(&table_name)
            .ok_or(DbError::TableNotFound(table_name))
    }
}

/// Builds the CREATE statement: identifier first, then declared columns.
/// Required columns are NOT NULL.
pub fn create_table_sql(model: &TableModel) -> String {
    let mut defs = vec![format!(
        "{} INTEGER PRIMARY KEY AUTOINCREMENT",
        quote_ident(ID_COLUMN)
    )];

    defs.extend(model.columns.iter().map(|column| {
        let mut def = format!(
            "{} {}",
            quote_ident(&column.name),
            column.column_type.physical_type().sql_type()
        );
        if column.required {
            def.push_str(" NOT NULL");
        }
        def
    }));

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_ident(&model.name),
        defs.join(", ")
    )
}
