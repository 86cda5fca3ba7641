//! Key-value persistence
//!
//! The viewer persists three things: the last viewed dance id, a cache of the
//! catalog for offline use, and the working setlists. Persistence is
//! best-effort; callers log failures and carry on.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,

    #[error("storage rejected '{key}': {message}")]
    Rejected { key: String, message: String },

    #[error("could not encode '{key}': {message}")]
    Encoding { key: String, message: String },
}

/// A string key-value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Read and decode a JSON value
///
/// A missing key, a read failure, and an undecodable value all yield `None`;
/// the latter two are logged.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let text = match store.get(key) {
        Ok(text) => text?,
        Err(e) => {
            log::warn!("Failed to read '{}': {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring unreadable '{}': {}", key, e);
            None
        }
    }
}

/// Encode and write a JSON value
pub fn save_json<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let text = serde_json::to_string(value).map_err(|e| StorageError::Encoding {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.set(key, &text)
}

/// In-memory store, for tests and for hosts without `localStorage`
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes all fail, as with a full or disabled storage
    pub fn read_only() -> Self {
        Self {
            entries: HashMap::new(),
            read_only: true,
        }
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Rejected {
                key: key.to_string(),
                message: "quota exceeded".to_string(),
            });
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Rejected {
                key: key.to_string(),
                message: "storage is read-only".to_string(),
            });
        }
        self.entries.remove(key);
        Ok(())
    }
}

/// The browser's `window.localStorage`
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .ok_or(StorageError::Unavailable)?
            .local_storage()
            .map_err(|_| StorageError::Unavailable)?
            .ok_or(StorageError::Unavailable)
    }

    fn rejected(key: &str, err: wasm_bindgen::JsValue) -> StorageError {
        StorageError::Rejected {
            key: key.to_string(),
            message: format!("{:?}", err),
        }
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| Self::rejected(key, e))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| Self::rejected(key, e))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| Self::rejected(key, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip_through_memory_store() {
        let mut store = MemoryStore::new();
        save_json(&mut store, "ids", &vec!["a", "b"]).unwrap();

        let ids: Option<Vec<String>> = load_json(&store, "ids");
        assert_eq!(ids, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_unreadable_value_loads_as_none() {
        let store = MemoryStore::new().with_entry("ids", "{not json");
        let ids: Option<Vec<String>> = load_json(&store, "ids");
        assert!(ids.is_none());
    }

    #[test]
    fn test_read_only_store_rejects_writes() {
        let mut store = MemoryStore::read_only();
        let err = save_json(&mut store, "ids", &Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, StorageError::Rejected { .. }));
    }
}
