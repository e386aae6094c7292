//! Host session store contract.

use std::sync::Arc;

use serde_json::Value;

use crate::SessionError;

/// A visitor's session: a mapping from key to arbitrary nested value that the
/// host persists across requests.
///
/// Implementations provide their own interior mutability. Concurrent requests
/// from one visitor race on individual keys; the last write wins.
pub trait SessionStore: Send + Sync {
    /// Get the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Value>, SessionError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: Value) -> Result<(), SessionError>;

    /// Delete the value stored under `key`.
    fn delete(&self, key: &str) -> Result<(), SessionError>;

    /// All keys currently present.
    fn keys(&self) -> Result<Vec<String>, SessionError>;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> Result<bool, SessionError> {
        Ok(self.get(key)?.is_some())
    }
}

/// Shared handle to a session store.
pub type SharedSession = Arc<dyn SessionStore>;
