//! In-process session store.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use widget_core::{SessionError, SessionStore};

/// A session held in process memory.
///
/// Values are stored as JSON trees; typed access goes through serde.
#[derive(Debug, Default)]
pub struct MemorySession {
    values: RwLock<HashMap<String, Value>>,
}

impl MemorySession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a typed value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use widget_session::MemorySession;
    ///
    /// let session = MemorySession::new();
    /// session.set_typed("cart_id", &"c-42").unwrap();
    /// let id: Option<String> = session.get_typed("cart_id").unwrap();
    /// assert_eq!(id.as_deref(), Some("c-42"));
    /// ```
    pub fn get_typed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SessionError> {
        match self.values.read().get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    /// Set a typed value.
    pub fn set_typed<T: Serialize>(&self, key: &str, value: &T) -> Result<(), SessionError> {
        let value = serde_json::to_value(value)?;
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Whether the session is empty.
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// Remove every key.
    pub fn clear(&self) {
        self.values.write().clear();
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Result<Option<Value>, SessionError> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), SessionError> {
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), SessionError> {
        self.values.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, SessionError> {
        let mut keys: Vec<String> = self.values.read().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn exists(&self, key: &str) -> Result<bool, SessionError> {
        Ok(self.values.read().contains_key(key))
    }
}
