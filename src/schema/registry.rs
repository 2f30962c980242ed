//! In-memory registry of table models
//!
//! The registry is the source of truth for validation. It holds models in
//! creation order and rejects duplicate names. Keeping it consistent with
//! the physical tables is the table manager's job.

use super::types::TableModel;
use crate::errors::{DbError, DbResult};

/// Ordered collection of registered table models
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    models: Vec<TableModel>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model.
    ///
    /// # Errors
    ///
    /// Returns `TableAlreadyExists` if a model with the same name is registered.
    pub fn register(&mut self, model: TableModel) -> DbResult<()> {
        if self.contains(&model.name) {
            return Err(DbError::TableAlreadyExists(model.name));
        }
        self.models.push(model);
        Ok(())
    }

    /// Looks up a model by name.
    pub fn lookup(&self, name: &str) -> Option<&TableModel> {
        self.position(name).map(|i| &self.models[i])
    }

    /// Removes a model, returning it if it was registered.
    pub fn unregister(&mut self, name: &str) -> Option<TableModel> {
        self.position(name).map(|i| self.models.remove(i))
    }

    /// Checks if a model with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns all models in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TableModel> {
        self.models.iter()
    }

    /// Returns all table names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.models.iter().map(|m| m.name.clone()).collect()
    }

    /// Returns the number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.models
            .iter()
            .position(|m| m.name.eq_ignore_ascii_case(name))
    }
}
