//! Embedded storage engine adapter (SQLite)
//!
//! One connection per database handle. Statements on the connection run
//! strictly in sequence; the connection lock is held only for the
//! duration of one operation's statements.
//!
//! All user values travel as bound parameters. Identifiers are quoted.

use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use tracing::{debug, instrument};

use crate::config::DatabaseConfig;
use crate::errors::DbResult;

/// A result row: column name and stored primitive, in projection order
pub type StoredRow = Vec<(String, SqlValue)>;

/// Owns the engine connection
pub struct SqliteEngine {
    conn: Mutex<Connection>,
    location: String,
}

impl SqliteEngine {
    /// Opens the engine at the configured location.
    #[instrument(skip_all, fields(path = %config.path))]
    pub fn open(config: &DatabaseConfig) -> DbResult<Self> {
        config.validate()?;

        let conn = if config.is_memory() {
            Connection::open_in_memory()?
        } else {
            Connection::open(&config.path)?
        };
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        conn.pragma_update(None, "foreign_keys", config.enforce_foreign_keys)?;

        debug!("Opened engine at {}", config.path);
        Ok(Self {
            conn: Mutex::new(conn),
            location: config.path.clone(),
        })
    }

    /// Returns the storage location this engine was opened with
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Runs `f` against the connection outside any explicit transaction.
    pub fn with_session<T>(&self, f: impl FnOnce(&Session<'_>) -> DbResult<T>) -> DbResult<T> {
        let conn = self.conn.lock();
        f(&Session { conn: &conn })
    }

    /// Runs `f` inside a transaction. Commits on `Ok`, rolls back on `Err`.
    pub fn transaction<T>(&self, f: impl FnOnce(&Session<'_>) -> DbResult<T>) -> DbResult<T> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let out = f(&Session { conn: &tx })?;
        tx.commit()?;
        Ok(out)
    }
}

/// Statement execution on a borrowed connection
pub struct Session<'c> {
    conn: &'c Connection,
}

impl Session<'_> {
    /// Executes a statement, returning the number of affected rows.
    pub fn execute(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        debug!(sql, "execute");
        Ok(self.conn.execute(sql, params_from_iter(params.iter()))?)
    }

    /// Executes an insert, returning the engine-assigned row identifier.
    pub fn insert(&self, sql: &str, params: &[SqlValue]) -> DbResult<i64> {
        self.execute(sql, params)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Runs a query and returns every row with its column names.
    pub fn query(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<StoredRow>> {
        debug!(sql, "query");
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            names
                .iter()
                .enumerate()
                .map(|(i, name)| Ok((name.clone(), row.get::<_, SqlValue>(i)?)))
                .collect::<rusqlite::Result<StoredRow>>()
        })?;

        let result = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(result)
    }

    /// Runs a single-value count query.
    pub fn count(&self, sql: &str, params: &[SqlValue]) -> DbResult<i64> {
        debug!(sql, "count");
        Ok(self
            .conn
            .query_row(sql, params_from_iter(params.iter()), |row| row.get(0))?)
    }

    /// Checks whether a physical table exists.
    pub fn table_exists(&self, name: &str) -> DbResult<bool> {
        let count = self.count(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
            &[SqlValue::Text(name.to_string())],
        )?;
        Ok(count > 0)
    }
}

/// Quotes an identifier for use in statement text.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
