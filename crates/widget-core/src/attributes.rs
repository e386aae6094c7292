//! Per-instance widget attributes.
//!
//! Every widget instance owns an [`Attributes`] map. An entry in the map is an
//! accessor: it exists independently of whether it holds a value (an unset
//! accessor holds `null`). Configuration defaults and constructor options flow
//! through [`Attributes::ensure_accessor`]; fields exported by the widget
//! itself are assigned with [`Attributes::set`].

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single attribute value.
pub type AttributeValue = Value;

/// Whether a value counts as set for provisioning purposes.
///
/// Only `null` and `false` are falsy; empty strings, zero and empty
/// collections are real values.
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

/// Ordered name -> value map backing a widget's accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(IndexMap<String, Value>);

impl Attributes {
    /// Create an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure an accessor named `name` exists, optionally assigning `value`.
    ///
    /// A missing accessor is created holding `null`. A truthy `value` is
    /// assigned whether or not the accessor already existed; an absent or
    /// falsy one leaves the current value untouched. Returns `true` when the
    /// accessor was newly created.
    pub fn ensure_accessor(&mut self, name: &str, value: Option<Value>) -> bool {
        let created = if self.0.contains_key(name) {
            false
        } else {
            self.0.insert(name.to_string(), Value::Null);
            true
        };

        if let Some(value) = value.filter(is_truthy) {
            self.0.insert(name.to_string(), value);
        }

        created
    }

    /// Whether an accessor named `name` exists.
    pub fn has_accessor(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Read an attribute. Unset accessors read as `Some(&Value::Null)`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Read a string attribute.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Deserialize an attribute into a typed value.
    ///
    /// Returns `None` when the accessor is missing or unset.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, serde_json::Error> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some),
        }
    }

    /// Assign an attribute through its accessor, creating it if needed.
    ///
    /// Unlike [`ensure_accessor`](Self::ensure_accessor) this writes falsy
    /// values too.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Remove an accessor.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.shift_remove(name)
    }

    /// Iterate over accessors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Accessor names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of accessors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no accessors.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build from a JSON object. Returns `None` for any other JSON value.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map.into_iter().collect())),
            _ => None,
        }
    }

    /// Convert into a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Attributes {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
