//! Database configuration
//!
//! The storage location is passed through to the engine unchanged; the
//! value `:memory:` selects an in-memory database.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{DbError, DbResult};

/// Location string selecting an in-memory database
pub const MEMORY_LOCATION: &str = ":memory:";

/// Configuration for opening a [`Database`](crate::Database)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Storage location (file path or ":memory:")
    #[serde(default = "default_path")]
    pub path: String,

    /// Engine busy timeout in milliseconds (default 5000)
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,

    /// Enforce foreign key constraints in the engine (default true)
    #[serde(default = "default_true")]
    pub enforce_foreign_keys: bool,
}

fn default_path() -> String {
    MEMORY_LOCATION.to_string()
}

fn default_busy_timeout() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            busy_timeout_ms: default_busy_timeout(),
            enforce_foreign_keys: true,
        }
    }
}

impl DatabaseConfig {
    /// Configuration for an in-memory database
    pub fn memory() -> Self {
        Self::default()
    }

    /// Configuration for a file database
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().into_owned(),
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> DbResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| DbError::Config(format!("Failed to read config: {}", e)))?;

        let config: DatabaseConfig = serde_json::from_str(&content)
            .map_err(|e| DbError::Config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> DbResult<()> {
        if self.path.trim().is_empty() {
            return Err(DbError::Config("path must not be empty".into()));
        }

        if self.busy_timeout_ms == 0 {
            return Err(DbError::Config("busy_timeout_ms must be > 0".into()));
        }

        Ok(())
    }

    /// Returns true if the configuration selects an in-memory database
    pub fn is_memory(&self) -> bool {
        self.path == MEMORY_LOCATION
    }
}
