//! In-memory record source.

use crate::error::StoreError;
use crate::source::{RecordIter, RecordSource, StoreName};
use serde_json::Value;
use std::collections::BTreeMap;

/// Record source backed by values held in memory, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    databases: BTreeMap<String, BTreeMap<StoreName, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty database.
    pub fn add_database(&mut self, db: impl Into<String>) -> &mut Self {
        self.databases.entry(db.into()).or_default();
        self
    }

    /// Append a value to a store, creating the database if needed.
    pub fn push(&mut self, db: &str, store: StoreName, value: Value) -> &mut Self {
        self.databases
            .entry(db.to_string())
            .or_default()
            .entry(store)
            .or_default()
            .push(value);
        self
    }
}

impl RecordSource for MemoryStore {
    fn databases(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.databases.keys().cloned().collect())
    }

    fn records(&self, db: &str, store: StoreName) -> Result<RecordIter<'_>, StoreError> {
        let stores = self
            .databases
            .get(db)
            .ok_or_else(|| StoreError::UnknownDatabase {
                name: db.to_string(),
            })?;
        match stores.get(&store) {
            Some(values) => Ok(Box::new(values.iter().cloned().map(Ok))),
            None => Ok(Box::new(std::iter::empty())),
        }
    }
}
