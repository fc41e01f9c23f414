//! crates/bytegurukul_core/src/storage.rs
//!
//! The durable client-side storage port (the browser's local storage in the web
//! frontend) and the JSON serialize/deserialize boundary the client stores use.

use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::warn;

//=========================================================================================
// Storage Keys
//=========================================================================================

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const CART_KEY: &str = "bytegurukul_cart";
pub const ORDERS_KEY: &str = "bytegurukul_orders";
pub const ENROLLMENTS_KEY: &str = "bytegurukul_enrollments";
pub const COMPLETED_COURSES_KEY: &str = "bytegurukul_completed_courses";

/// Namespaces a store key by the identity that owns it. Anonymous data lives under
/// the bare key.
pub fn scoped_key(base: &str, owner: Option<&str>) -> String {
    match owner {
        Some(owner) => format!("{}:{}", base, owner),
        None => base.to_string(),
    }
}

//=========================================================================================
// The Port
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(String),
    #[error("Failed to serialize value for '{key}': {message}")]
    Serialize { key: String, message: String },
}

/// A string key/value store that survives restarts.
pub trait DurableStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Reads and decodes a JSON value. Undecodable data is discarded and reported as absent.
pub fn load_json<T: DeserializeOwned>(
    storage: &dyn DurableStorage,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = storage.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key, error = %e, "Discarding corrupt stored value");
            storage.remove(key)?;
            Ok(None)
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(
    storage: &dyn DurableStorage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|e| StorageError::Serialize {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    storage.set(key, &raw)
}

//=========================================================================================
// In-Memory Implementation
//=========================================================================================

/// Storage that lives only as long as the process. Useful for tests and headless use.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DurableStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}
