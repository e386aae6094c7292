//! Runtime configuration for widget loading and state handling.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::paths::WidgetPaths;
use crate::WidgetError;

/// Default location of widget folders, relative to the application root.
pub const DEFAULT_WIDGETS_ROOT: &str = "app/views/widgets";

/// Whether widget sources are loaded once per process or on every use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReloadPolicy {
    /// Load a widget type the first time it is requested and reuse it afterwards.
    #[default]
    Cached,
    /// Reload on every request (development mode).
    Always,
}

/// How construction treats an existing permanent state slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermanentStatePolicy {
    /// Every construction resets permanent state to an empty mapping.
    #[default]
    Reset,
    /// Permanent state is created only when the slot is absent.
    Preserve,
}

/// File formats accepted for runtime and per-widget configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Format for a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "yml" | "yaml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Format for a file path, from its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Deserialize `content` in this format.
    pub fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, String> {
        match self {
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// Configuration for the widget runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetsConfig {
    /// Folder containing one subfolder per widget type. `None` means unset.
    #[serde(default = "default_widgets_root")]
    pub widgets_root: Option<PathBuf>,

    /// View-relative folder used when naming widget partials.
    #[serde(default = "default_views_folder")]
    pub views_folder: String,

    /// Extension of widget source files.
    #[serde(default = "default_source_extension")]
    pub source_extension: String,

    /// Extension of widget partial files.
    #[serde(default = "default_partial_extension")]
    pub partial_extension: String,

    /// Configuration file extensions, in lookup order.
    #[serde(default = "default_config_extensions")]
    pub config_extensions: Vec<String>,

    /// Source reload policy.
    #[serde(default)]
    pub reload: ReloadPolicy,

    /// Permanent state policy applied at construction.
    #[serde(default)]
    pub permanent_state: PermanentStatePolicy,
}

fn default_widgets_root() -> Option<PathBuf> {
    Some(PathBuf::from(DEFAULT_WIDGETS_ROOT))
}

fn default_views_folder() -> String {
    "widgets".to_string()
}

fn default_source_extension() -> String {
    "rs".to_string()
}

fn default_partial_extension() -> String {
    "html".to_string()
}

fn default_config_extensions() -> Vec<String> {
    vec!["toml".to_string(), "json".to_string(), "yml".to_string()]
}

impl Default for WidgetsConfig {
    fn default() -> Self {
        Self {
            widgets_root: default_widgets_root(),
            views_folder: default_views_folder(),
            source_extension: default_source_extension(),
            partial_extension: default_partial_extension(),
            config_extensions: default_config_extensions(),
            reload: ReloadPolicy::default(),
            permanent_state: PermanentStatePolicy::default(),
        }
    }
}

impl WidgetsConfig {
    /// Create a configuration rooted at the given widgets folder.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            widgets_root: Some(root.into()),
            ..Default::default()
        }
    }

    /// Load configuration from a TOML, JSON or YAML file (chosen by extension).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WidgetError> {
        let path = path.as_ref();
        let invalid = |message: String| WidgetError::InvalidConfig {
            widget: "*".to_string(),
            path: path.to_path_buf(),
            message,
        };

        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| invalid("unsupported configuration file extension".to_string()))?;
        let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let config: Self = format.parse(&content).map_err(invalid)?;
        config.validate().map_err(invalid)?;
        Ok(config)
    }

    /// Check that every per-widget configuration extension has a known format.
    pub fn validate(&self) -> Result<(), String> {
        match self
            .config_extensions
            .iter()
            .find(|ext| ConfigFormat::from_extension(ext).is_none())
        {
            Some(ext) => Err(format!("unsupported config_extensions entry '{}'", ext)),
            None => Ok(()),
        }
    }

    /// Set the widgets root folder.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.widgets_root = Some(root.into());
        self
    }

    /// Clear the widgets root folder.
    pub fn without_root(mut self) -> Self {
        self.widgets_root = None;
        self
    }

    /// Set the view-relative widgets folder.
    pub fn with_views_folder(mut self, folder: impl Into<String>) -> Self {
        self.views_folder = folder.into();
        self
    }

    /// Set the source file extension.
    pub fn with_source_extension(mut self, ext: impl Into<String>) -> Self {
        self.source_extension = ext.into();
        self
    }

    /// Set the per-widget configuration extensions, in lookup order.
    pub fn with_config_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the source reload policy.
    pub fn with_reload(mut self, reload: ReloadPolicy) -> Self {
        self.reload = reload;
        self
    }

    /// Set the permanent state policy.
    pub fn with_permanent_state(mut self, policy: PermanentStatePolicy) -> Self {
        self.permanent_state = policy;
        self
    }

    /// Path resolver for the configured root, if any.
    pub fn paths(&self) -> Option<WidgetPaths> {
        self.widgets_root.as_ref().map(WidgetPaths::new)
    }
}
