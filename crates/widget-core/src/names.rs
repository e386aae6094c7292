//! Widget naming conventions.
//!
//! A widget type `hello_world` is implemented by the class `HelloWorldWidget`.
//! The conversion is only defined for names where it round-trips, so every
//! type name has exactly one class name and vice versa.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::WidgetError;

/// Fixed suffix every widget class name carries.
pub const CLASS_SUFFIX: &str = "Widget";

/// Identifier used when a widget is built without an `identifier` option.
pub const DEFAULT_IDENTIFIER: &str = "default";

/// Normalized lower-snake-case name of a widget kind (e.g. `hello_world`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WidgetTypeName(String);

impl WidgetTypeName {
    /// Validate and wrap a type name.
    pub fn new(name: impl Into<String>) -> Result<Self, WidgetError> {
        let name = name.into();
        if is_valid_type_name(&name) {
            Ok(Self(name))
        } else {
            Err(WidgetError::InvalidTypeName(name))
        }
    }

    /// Derive the type name from a class name.
    ///
    /// ```
    /// use widget_core::WidgetTypeName;
    ///
    /// let name = WidgetTypeName::from_class_name("HelloWorldWidget").unwrap();
    /// assert_eq!(name.as_str(), "hello_world");
    /// ```
    pub fn from_class_name(class: &str) -> Result<Self, WidgetError> {
        let stem = class
            .strip_suffix(CLASS_SUFFIX)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| WidgetError::InvalidClassName(class.to_string()))?;

        let name = underscore(stem);
        if !is_valid_type_name(&name) || camelize(&name) != stem {
            return Err(WidgetError::InvalidClassName(class.to_string()));
        }
        Ok(Self(name))
    }

    /// Conventional class name for this type (`hello_world` -> `HelloWorldWidget`).
    pub fn class_name(&self) -> String {
        format!("{}{}", camelize(&self.0), CLASS_SUFFIX)
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for WidgetTypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for WidgetTypeName {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for WidgetTypeName {
    type Error = WidgetError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for WidgetTypeName {
    type Error = WidgetError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<WidgetTypeName> for String {
    fn from(name: WidgetTypeName) -> Self {
        name.0
    }
}

/// Disambiguates several instances of one widget type within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WidgetIdentifier(String);

impl WidgetIdentifier {
    /// Create an identifier from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Read the identifier from an instance's `identifier` attribute.
    ///
    /// A missing attribute yields [`DEFAULT_IDENTIFIER`]. An accessor that
    /// exists but is unset yields the empty identifier, giving keys such as
    /// `widget_sidebar__page`. Non-string scalars use their JSON rendering, so
    /// `7` becomes `"7"`.
    pub fn from_attribute(value: Option<&Value>) -> Self {
        match value {
            None => Self::default(),
            Some(Value::Null) => Self(String::new()),
            Some(Value::String(s)) => Self(s.clone()),
            Some(other) => Self(other.to_string()),
        }
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the implicit default identifier.
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_IDENTIFIER
    }
}

impl Default for WidgetIdentifier {
    fn default() -> Self {
        Self(DEFAULT_IDENTIFIER.to_string())
    }
}

impl fmt::Display for WidgetIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WidgetIdentifier {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for WidgetIdentifier {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// Each `_`-separated segment starts with a lowercase letter and continues
// with lowercase letters or digits.
fn is_valid_type_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('_').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
                && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

fn camelize(name: &str) -> String {
    name.split('_')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn underscore(camel: &str) -> String {
    let mut out = String::with_capacity(camel.len() + 4);
    for (i, c) in camel.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
