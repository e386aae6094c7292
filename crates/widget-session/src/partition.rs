//! Per-widget state slots inside a visitor's session.

use serde_json::{Map, Value};
use widget_core::{SessionError, SessionStore, WidgetError, WidgetIdentifier, WidgetTypeName};

use crate::key::{SessionStateKey, StateScope};

/// Contents of a state slot.
pub type StateMap = Map<String, Value>;

/// Reads and writes the page and permanent state slots of one
/// (widget type, identifier) pair.
///
/// Every operation fails with [`WidgetError::SessionUnavailable`] when the
/// host did not supply a session.
#[derive(Clone)]
pub struct StatePartition<'a> {
    widget: &'a WidgetTypeName,
    identifier: WidgetIdentifier,
    session: Option<&'a dyn SessionStore>,
}

impl<'a> StatePartition<'a> {
    /// Create a partition view.
    pub fn new(
        widget: &'a WidgetTypeName,
        identifier: WidgetIdentifier,
        session: Option<&'a dyn SessionStore>,
    ) -> Self {
        Self {
            widget,
            identifier,
            session,
        }
    }

    /// Identifier used for this partition.
    pub fn identifier(&self) -> &WidgetIdentifier {
        &self.identifier
    }

    /// Session key of the slot for `scope`.
    pub fn key(&self, scope: StateScope) -> SessionStateKey {
        SessionStateKey::new(self.widget, &self.identifier, scope)
    }

    fn session(&self) -> Result<&'a dyn SessionStore, WidgetError> {
        self.session.ok_or_else(|| WidgetError::SessionUnavailable {
            widget: self.widget.to_string(),
        })
    }

    /// Reset the slot for `scope` to an empty mapping.
    pub fn create_state(&self, scope: StateScope) -> Result<(), WidgetError> {
        let session = self.session()?;
        let key = self.key(scope);
        tracing::debug!(widget = %self.widget, key = %key, "resetting widget state");
        session.set(key.as_str(), Value::Object(StateMap::new()))?;
        Ok(())
    }

    /// Create the slot for `scope` only if the session doesn't hold it yet.
    ///
    /// Returns `true` when the slot was created.
    pub fn create_state_if_absent(&self, scope: StateScope) -> Result<bool, WidgetError> {
        let session = self.session()?;
        let key = self.key(scope);
        if session.exists(key.as_str())? {
            return Ok(false);
        }
        tracing::debug!(widget = %self.widget, key = %key, "creating widget state");
        session.set(key.as_str(), Value::Object(StateMap::new()))?;
        Ok(true)
    }

    /// Current contents of the slot for `scope`.
    ///
    /// A slot that was never created reads as empty.
    pub fn read_state(&self, scope: StateScope) -> Result<StateMap, WidgetError> {
        let session = self.session()?;
        let key = self.key(scope);
        match session.get(key.as_str())? {
            None | Some(Value::Null) => Ok(StateMap::new()),
            Some(Value::Object(map)) => Ok(map),
            Some(_) => Err(SessionError::CorruptSlot {
                key: key.as_str().to_string(),
            }
            .into()),
        }
    }

    /// Replace the contents of the slot for `scope`.
    pub fn write_state(&self, scope: StateScope, state: StateMap) -> Result<(), WidgetError> {
        let session = self.session()?;
        session.set(self.key(scope).as_str(), Value::Object(state))?;
        Ok(())
    }

    /// Read-modify-write the slot for `scope`.
    pub fn update_state<R>(
        &self,
        scope: StateScope,
        f: impl FnOnce(&mut StateMap) -> R,
    ) -> Result<R, WidgetError> {
        let mut state = self.read_state(scope)?;
        let result = f(&mut state);
        self.write_state(scope, state)?;
        Ok(result)
    }

    /// Discard all permanent state for this (type, identifier) pair.
    pub fn clear_permanent_state(&self) -> Result<(), WidgetError> {
        self.create_state(StateScope::Permanent)
    }

    /// Handle on the slot for `scope`.
    pub fn slot(&self, scope: StateScope) -> StateSlot<'a> {
        StateSlot {
            partition: self.clone(),
            scope,
        }
    }
}

/// Handle on a single state slot.
///
/// Every call goes straight to the session, so writes are visible to any other
/// instance sharing the same (type, identifier).
#[derive(Clone)]
pub struct StateSlot<'a> {
    partition: StatePartition<'a>,
    scope: StateScope,
}

impl<'a> StateSlot<'a> {
    /// Scope of this slot.
    pub fn scope(&self) -> StateScope {
        self.scope
    }

    /// Session key of this slot.
    pub fn key(&self) -> SessionStateKey {
        self.partition.key(self.scope)
    }

    /// Copy of the slot contents.
    pub fn snapshot(&self) -> Result<StateMap, WidgetError> {
        self.partition.read_state(self.scope)
    }

    /// Read one entry.
    pub fn get(&self, name: &str) -> Result<Option<Value>, WidgetError> {
        Ok(self.snapshot()?.remove(name))
    }

    /// Write one entry, returning the previous value.
    pub fn insert(&self, name: impl Into<String>, value: impl Into<Value>) -> Result<Option<Value>, WidgetError> {
        let (name, value) = (name.into(), value.into());
        self.partition
            .update_state(self.scope, |state| state.insert(name, value))
    }

    /// Remove one entry, returning it.
    pub fn remove(&self, name: &str) -> Result<Option<Value>, WidgetError> {
        self.partition.update_state(self.scope, |state| state.remove(name))
    }

    /// Read-modify-write the slot.
    pub fn update<R>(&self, f: impl FnOnce(&mut StateMap) -> R) -> Result<R, WidgetError> {
        self.partition.update_state(self.scope, f)
    }

    /// Reset the slot to empty.
    pub fn reset(&self) -> Result<(), WidgetError> {
        self.partition.create_state(self.scope)
    }
}
