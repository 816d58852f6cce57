// File: rusty-stores/src/storage.rs
// Purpose: Stores persisted as JSON in a key-value storage backend

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::store::{read, write, Callback, Readable, Subscription, Writable, WritableStore};
use crate::StoreError;

/// Key-value storage backend (the browser Storage API shape)
pub trait Storage: Send + Sync {
    /// Returns the raw value stored under `key`
    fn get_item(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`; removing a missing key is not an error
    fn remove_item(&self, key: &str);
}

/// Which storage area a persisted store lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
    /// Survives restarts
    #[default]
    Local,
    /// Scoped to one session
    Session,
}

/// The local and session storage backends of an application
#[derive(Clone)]
pub struct StorageAreas {
    pub local: Arc<dyn Storage>,
    pub session: Arc<dyn Storage>,
}

impl StorageAreas {
    /// Two independent in-memory areas
    pub fn in_memory() -> Self {
        Self {
            local: Arc::new(MemoryStorage::new()),
            session: Arc::new(MemoryStorage::new()),
        }
    }

    /// The backend for an area
    pub fn area(&self, area: StorageArea) -> Arc<dyn Storage> {
        match area {
            StorageArea::Local => Arc::clone(&self.local),
            StorageArea::Session => Arc::clone(&self.session),
        }
    }
}

// ============================================================================
// MemoryStorage
// ============================================================================

/// Thread-safe in-memory storage
///
/// An optional quota (bytes of keys plus values) makes writes fail the way a
/// full browser storage does.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the total size of stored keys and values
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    pub fn len(&self) -> usize {
        read(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        read(&self.items).is_empty()
    }

    pub fn clear(&self) {
        write(&self.items).clear();
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        read(&self.items).get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut items = write(&self.items);

        if let Some(quota) = self.quota {
            let used: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > quota {
                return Err(StoreError::Storage(format!(
                    "quota of {} bytes exceeded writing '{}'",
                    quota, key
                )));
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        write(&self.items).remove(key);
    }
}

// ============================================================================
// Persisted
// ============================================================================

/// Writable store mirrored to a storage key as JSON
pub struct Persisted<T> {
    key: String,
    storage: Arc<dyn Storage>,
    initial: T,
    store: Writable<T>,
}

/// Creates a store backed by `storage[key]`
///
/// The stored JSON is loaded if present; a missing key starts from
/// `initial`. A stored value that no longer deserializes is logged and
/// replaced by `initial`.
///
/// # Examples
///
/// ```
/// use rusty_stores::storage::{persisted, MemoryStorage, Storage};
/// use rusty_stores::{Readable, WritableStore};
/// use std::sync::Arc;
///
/// let storage = Arc::new(MemoryStorage::new());
/// let theme = persisted(storage.clone(), "theme", "light".to_string());
///
/// theme.set("dark".to_string());
/// assert_eq!(storage.get_item("theme"), Some("\"dark\"".to_string()));
///
/// // A second store on the same key picks the value up
/// let again = persisted(storage, "theme", "light".to_string());
/// assert_eq!(again.get(), "dark");
/// ```
pub fn persisted<T>(storage: Arc<dyn Storage>, key: impl Into<String>, initial: T) -> Persisted<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    let key = key.into();
    let value = load(storage.as_ref(), &key).unwrap_or_else(|| initial.clone());

    Persisted {
        store: Writable::new(value),
        key,
        storage,
        initial,
    }
}

fn load<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let raw = storage.get_item(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!("Ignoring unreadable stored value for '{}': {}", key, err);
            None
        }
    }
}

impl<T> Persisted<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// The storage key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Writes to storage, then updates the store
    ///
    /// On failure neither storage nor the in-memory value change.
    pub fn try_set(&self, value: T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&value)?;
        self.storage.set_item(&self.key, &raw)?;
        self.store.set(value);
        Ok(())
    }

    /// Re-reads the key, e.g. after another writer changed it
    pub fn reload(&self) {
        let value = load(self.storage.as_ref(), &self.key).unwrap_or_else(|| self.initial.clone());
        self.store.set(value);
    }

    /// Removes the key and resets to the initial value
    pub fn clear(&self) {
        self.storage.remove_item(&self.key);
        self.store.set(self.initial.clone());
    }
}

impl<T> Readable<T> for Persisted<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    fn get(&self) -> T {
        self.store.get()
    }

    fn subscribe_with(&self, callback: Callback<T>) -> Subscription {
        self.store.subscribe_with(callback)
    }
}

impl<T> WritableStore<T> for Persisted<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Sets the value; if it cannot be persisted it is kept in memory only
    fn set(&self, value: T) {
        if let Err(err) = self.try_set(value.clone()) {
            tracing::warn!("Could not persist '{}', keeping value in memory: {}", self.key, err);
            self.store.set(value);
        }
    }
}
