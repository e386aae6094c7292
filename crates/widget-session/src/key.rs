//! Session state key composition.

use std::fmt;

use serde::{Deserialize, Serialize};
use widget_core::{WidgetIdentifier, WidgetTypeName};

/// Namespace token every widget state key starts with.
pub const KEY_NAMESPACE: &str = "widget";

/// The two tiers of widget state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateScope {
    /// Reset on every render.
    Page,
    /// Survives across requests until cleared.
    Permanent,
}

impl StateScope {
    /// Token used in session keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Permanent => "permanent",
        }
    }
}

impl fmt::Display for StateScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session key of one widget state slot: `widget_<type>_<identifier>_<scope>`.
///
/// Derived purely from (type, identifier, scope), so separately constructed
/// instances with the same identity share a slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionStateKey {
    key: String,
    widget: WidgetTypeName,
    identifier: WidgetIdentifier,
    scope: StateScope,
}

impl SessionStateKey {
    /// Compose the key for a state slot.
    pub fn new(widget: &WidgetTypeName, identifier: &WidgetIdentifier, scope: StateScope) -> Self {
        Self {
            key: format!("{}_{}_{}_{}", KEY_NAMESPACE, widget, identifier, scope),
            widget: widget.clone(),
            identifier: identifier.clone(),
            scope,
        }
    }

    /// Get the key string.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Widget type the slot belongs to.
    pub fn widget(&self) -> &WidgetTypeName {
        &self.widget
    }

    /// Identifier the slot belongs to.
    pub fn identifier(&self) -> &WidgetIdentifier {
        &self.identifier
    }

    /// Scope of the slot.
    pub fn scope(&self) -> StateScope {
        self.scope
    }
}

impl fmt::Display for SessionStateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// Convenience wrapper returning just the key string.
pub fn session_key(widget: &WidgetTypeName, identifier: &WidgetIdentifier, scope: StateScope) -> String {
    SessionStateKey::new(widget, identifier, scope).key
}
