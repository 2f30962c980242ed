//! Row manager: INSERT / SELECT / DELETE against registered tables
//!
//! Every operation:
//! 1. Looks up the table model (TABLE_NOT_FOUND otherwise)
//! 2. Validates the request against the model before any statement runs
//! 3. Binds values as parameters; identifiers are quoted, never values
//! 4. Decodes results through the value codec

use rusqlite::types::Value as SqlValue;
use tracing::{debug, instrument};

use super::query::{SortDirection, TableQuery};
use crate::codec::ValueCodec;
use crate::engine::{quote_ident, SqliteEngine};
use crate::errors::{DbError, DbResult};
use crate::schema::{RowValidator, SchemaRegistry, TableModel, ID_COLUMN};
use crate::value::Row;

/// Runs row operations against registered tables
pub struct RowManager<'a> {
    engine: &'a SqliteEngine,
    registry: &'a SchemaRegistry,
}

impl<'a> RowManager<'a> {
    pub fn new(engine: &'a SqliteEngine, registry: &'a SchemaRegistry) -> Self {
        Self { engine, registry }
    }

    fn model(&self, table: &str) -> DbResult<&'a TableModel> {
        self.registry
            .lookup(table)
            .ok_or_else(|| DbError::TableNotFound(table.to_string()))
    }

    /// Validates, encodes and inserts one row.
    ///
    /// Returns the engine-assigned identifier. Undeclared keys in `row` are ignored.
    #[instrument(skip_all, fields(table = %table))]
    pub fn insert_row(&self, table: &str, row: &Row) -> DbResult<i64> {
        let model = self.model(table)?;
        let (sql, params) = prepare_insert(model, row)?;

        let id = self.engine.with_session(|s| s.insert(&sql, &params))?;
        debug!(id, "Inserted row");
        Ok(id)
    }

    /// Inserts rows one at a time into the same table.
    ///
    /// Stops at the first failure; rows inserted before it stay committed.
    /// An unregistered table fails even when `rows` is empty.
    pub fn insert_rows(&self, table: &str, rows: &[Row]) -> DbResult<Vec<i64>> {
        self.model(table)?;
        rows.iter().map(|row| self.insert_row(table, row)).collect()
    }

    /// Inserts rows one at a time, each into its own table.
    ///
    /// Every named table is looked up before the first insert. After that,
    /// same partial-completion semantics as [`insert_rows`](Self::insert_rows).
    pub fn insert_rows_each<S: AsRef<str>>(&self, entries: &[(S, Row)]) -> DbResult<Vec<i64>> {
        for (table, _) in entries {
            self.model(table.as_ref())?;
        }
        entries
            .iter()
            .map(|(table, row)| self.insert_row(table.as_ref(), row))
            .collect()
    }

    /// Inserts all rows or none.
    ///
    /// Every row is validated and encoded before the transaction starts; an
    /// engine failure rolls back the rows already written.
    #[instrument(skip_all, fields(table = %table, rows = rows.len()))]
    pub fn insert_rows_atomic(&self, table: &str, rows: &[Row]) -> DbResult<Vec<i64>> {
        let model = self.model(table)?;
        let prepared = rows
            .iter()
            .map(|row| prepare_insert(model, row))
            .collect::<DbResult<Vec<_>>>()?;

        self.engine.transaction(|s| {
            prepared
                .iter()
                .map(|(sql, params)| s.insert(sql, params))
                .collect()
        })
    }

    /// Reads rows from a table.
    ///
    /// The identifier is always the first column, named `id`. Without a sort
    /// the rows come back in identifier order; without a limit, all of them.
    ///
    /// # Errors
    ///
    /// - `TableNotFound` if the table is not registered
    /// - `UnknownColumn` if a projected or sort column is not declared
    /// - `InvalidLimit` if the limit is below 1
    #[instrument(skip_all, fields(table = %table))]
    pub fn get_table(&self, table: &str, query: &TableQuery) -> DbResult<Vec<Row>> {
        let model = self.model(table)?;
        let sql = select_sql(model, query)?;
        let params: Vec<SqlValue> = query.limit.map(SqlValue::Integer).into_iter().collect();

        let stored = self.engine.with_session(|s| s.query(&sql, &params))?;
        debug!(rows = stored.len(), "Read rows");

        stored
            .into_iter()
            .map(|row| ValueCodec::decode_row(model, row))
            .collect()
    }

    /// Deletes the row with the given identifier.
    ///
    /// Fails with `RowNotFound` if no such row exists.
    #[instrument(skip_all, fields(table = %table, id = id))]
    pub fn delete_row_by_id(&self, table: &str, id: i64) -> DbResult<()> {
        let model = self.model(table)?;
        let table_ident = quote_ident(&model.name);
        let id_ident = quote_ident(ID_COLUMN);
        let params = [SqlValue::Integer(id)];

        self.engine.with_session(|s| {
            let count = s.count(
                &format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", table_ident, id_ident),
                &params,
            )?;
            if count == 0 {
                return Err(DbError::RowNotFound {
                    table: model.name.clone(),
                    id,
                });
            }

            s.execute(
                &format!("DELETE FROM {} WHERE {} = ?1", table_ident, id_ident),
                &params,
            )?;
            Ok(())
        })?;

        debug!("Deleted row");
        Ok(())
    }

    /// Returns the number of rows in a table.
    pub fn count_rows(&self, table: &str) -> DbResult<i64> {
        let model = self.model(table)?;
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(&model.name));
        self.engine.with_session(|s| s.count(&sql, &[]))
    }
}

/// Validates and encodes a row, returning the INSERT statement and its parameters.
fn prepare_insert(model: &TableModel, row: &Row) -> DbResult<(String, Vec<SqlValue>)> {
    RowValidator::validate_row(model, row)?;
    let params = ValueCodec::encode_row(model, row)?;
    Ok((insert_sql(model), params))
}

/// Builds the INSERT statement across all declared columns. The identifier is never supplied.
pub fn insert_sql(model: &TableModel) -> String {
    let table = quote_ident(&model.name);
    if model.columns.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES", table);
    }

    let columns: Vec<String> = model.columns.iter().map(|c| quote_ident(&c.name)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Checks a read request against the model and builds the SELECT statement.
///
/// The limit, if any, is bound as parameter `?1`.
pub fn select_sql(model: &TableModel, query: &TableQuery) -> DbResult<String> {
    let mut unknown = Vec::new();

    let projected: Vec<&str> = match &query.columns {
        None => model.column_names().collect(),
        Some(requested) => requested
            .iter()
            .filter_map(|name| match model.column(name) {
                Some(column) => Some(column.name.as_str()),
                // Already the first result column
                None if name.eq_ignore_ascii_case(ID_COLUMN) => None,
                None => {
                    unknown.push(name.clone());
                    None
                }
            })
            .collect(),
    };

    let (sort_column, direction) = match &query.sort {
        None => (ID_COLUMN, SortDirection::Asc),
        Some(sort) if sort.column.eq_ignore_ascii_case(ID_COLUMN) => (ID_COLUMN, sort.direction),
        Some(sort) => match model.column(&sort.column) {
            Some(column) => (column.name.as_str(), sort.direction),
            None => {
                if !unknown.contains(&sort.column) {
                    unknown.push(sort.column.clone());
                }
                (ID_COLUMN, sort.direction)
            }
        },
    };

    if !unknown.is_empty() {
        return Err(DbError::UnknownColumn {
            table: model.name.clone(),
            columns: unknown,
            available: model.column_listing(),
        });
    }

    if let Some(limit) = query.limit {
        if limit < 1 {
            return Err(DbError::InvalidLimit(limit));
        }
    }

    let select_list = std::iter::once(ID_COLUMN)
        .chain(projected)
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!(
        "SELECT {} FROM {} ORDER BY {} {}",
        select_list,
        quote_ident(&model.name),
        quote_ident(sort_column),
        direction.as_sql()
    );
    if query.limit.is_some() {
        sql.push_str(" LIMIT ?1");
    }

    Ok(sql)
}
