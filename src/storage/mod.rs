//! Opaque persistent string storage and the documents written into it.

pub mod json_backend;
pub mod memory;
pub mod snapshot;

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::Result;

/// Abstraction over persistence backends keyed by string.
///
/// Values are opaque to the backend; callers own the encoding.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Reads and decodes a JSON value stored under `key`.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encodes `value` as JSON and stores it under `key`.
pub fn write_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    store.set(key, &json)
}

pub use json_backend::JsonFileStore;
pub use memory::MemoryStore;
pub use snapshot::{ExportDocument, PersistedLedger, CURRENT_SCHEMA_VERSION};
