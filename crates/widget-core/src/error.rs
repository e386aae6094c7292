//! Error types for widget loading, construction and rendering.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a [`SessionStore`](crate::SessionStore) backend.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Failed to serialize or deserialize a session value.
    #[error("session serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The backing store rejected the operation.
    #[error("session store operation failed: {0}")]
    Store(String),

    /// A state slot holds something other than a mapping.
    #[error("session slot '{key}' does not hold a state mapping")]
    CorruptSlot { key: String },
}

/// Broad classification of a [`WidgetError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The host did not supply something the runtime needs.
    Configuration,
    /// Widget source could not be loaded or did not define its class.
    LoadFailure,
    /// The conventional symbol exists but is not a widget class.
    TypeMismatch,
    /// The session backend failed.
    Session,
    /// The template engine failed.
    Render,
    /// A widget hook or factory failed.
    Hook,
}

/// Errors that can occur while resolving, building or rendering a widget.
///
/// None of these are retried; each aborts the render of the widget it names.
#[derive(Error, Debug)]
pub enum WidgetError {
    /// No widgets root was configured before a load was attempted.
    #[error("no widgets folder set (while loading widget '{widget}')")]
    RootNotConfigured { widget: String },

    /// State was accessed but the request carries no session.
    #[error("widget '{widget}' needs a session but the request has none")]
    SessionUnavailable { widget: String },

    /// A widget configuration file exists but could not be parsed.
    #[error("invalid configuration for widget '{widget}' at {}: {message}", path.display())]
    InvalidConfig {
        widget: String,
        path: PathBuf,
        message: String,
    },

    /// A name does not follow the lower-snake-case widget naming convention.
    #[error("invalid widget type name '{0}'")]
    InvalidTypeName(String),

    /// A class name does not end with the `Widget` suffix or does not map back.
    #[error("invalid widget class name '{0}'")]
    InvalidClassName(String),

    /// The widget source file is missing.
    #[error("unable to load widget '{widget}': no source at {}", path.display())]
    SourceNotFound { widget: String, path: PathBuf },

    /// Loading the source did not define the conventional class.
    #[error("unable to load widget '{widget}': {class} is not defined")]
    ClassNotDefined { widget: String, class: String },

    /// The conventional symbol resolved to something that is not a class.
    #[error("widget class {class} for '{widget}' is not a class")]
    NotAClass { widget: String, class: String },

    /// A widget partial was requested outside a widget render.
    #[error("cannot render widget partial '{partial}': no widget is being rendered")]
    NoActiveWidget { partial: String },

    /// The template engine failed to render a partial.
    #[error("failed to render partial '{partial}': {message}")]
    Render { partial: String, message: String },

    /// Session backend failure.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Failure raised from a widget hook, factory or template engine.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WidgetError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RootNotConfigured { .. }
            | Self::SessionUnavailable { .. }
            | Self::InvalidConfig { .. }
            | Self::InvalidTypeName(_)
            | Self::InvalidClassName(_)
            | Self::NoActiveWidget { .. } => ErrorKind::Configuration,
            Self::SourceNotFound { .. } | Self::ClassNotDefined { .. } => ErrorKind::LoadFailure,
            Self::NotAClass { .. } => ErrorKind::TypeMismatch,
            Self::Session(_) => ErrorKind::Session,
            Self::Render { .. } => ErrorKind::Render,
            Self::Other(_) => ErrorKind::Hook,
        }
    }

    /// Create a render error for a partial.
    pub fn render(partial: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            partial: partial.into(),
            message: message.into(),
        }
    }
}
