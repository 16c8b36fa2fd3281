//! In-memory record store
//!
//! Records are kept as serialized JSON values, so everything written here goes
//! through the same serde path as the file store. Used by tests and by callers
//! that do not need persistence.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

use super::{validate_name, RecordStore, StoreError, StoreFormat};

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    collections: HashMap<String, serde_json::Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of collections that have been written at least once
    pub fn collection_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.collections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl RecordStore for MemoryStore {
    fn read_collection<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, StoreError> {
        validate_name(name)?;
        match self.collections.get(name) {
            None => Ok(Vec::new()),
            Some(value) => {
                serde_json::from_value(value.clone()).map_err(|e| StoreError::Parse {
                    name: name.to_string(),
                    format: StoreFormat::Json,
                    message: e.to_string(),
                })
            }
        }
    }

    fn write_collection<T: Serialize>(
        &mut self,
        name: &str,
        records: &[T],
    ) -> Result<(), StoreError> {
        validate_name(name)?;
        let value = serde_json::to_value(records).map_err(|e| StoreError::Serialize {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        self.collections.insert(name.to_string(), value);
        Ok(())
    }

    fn write_collections<T: Serialize>(
        &mut self,
        writes: &[(&str, &[T])],
    ) -> Result<(), StoreError> {
        // Serialize everything before touching the map
        let mut staged = Vec::with_capacity(writes.len());
        for (name, records) in writes {
            validate_name(name)?;
            let value = serde_json::to_value(records).map_err(|e| StoreError::Serialize {
                name: name.to_string(),
                message: e.to_string(),
            })?;
            staged.push((name.to_string(), value));
        }
        self.collections.extend(staged);
        Ok(())
    }
}
