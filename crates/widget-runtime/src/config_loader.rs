//! Per-widget configuration defaults.

use std::collections::HashMap;
use std::path::Path;

use parking_lot::RwLock;
use serde_json::Value;
use widget_core::{
    Attributes, ConfigFormat, ReloadPolicy, WidgetError, WidgetPaths, WidgetTypeName, WidgetsConfig,
};

/// Source of per-widget configuration defaults.
pub trait ConfigSource: Send + Sync {
    /// Read the defaults for `widget`. `Ok(None)` means the widget has no
    /// configuration, which is not an error.
    fn load(&self, widget: &WidgetTypeName) -> Result<Option<Attributes>, WidgetError>;
}

/// Reads `<root>/<type>/<type>.<ext>` for the first configured extension
/// that exists.
#[derive(Debug, Clone)]
pub struct FsConfigSource {
    paths: Option<WidgetPaths>,
    extensions: Vec<String>,
}

impl FsConfigSource {
    /// Create a source for the configured widgets root.
    pub fn from_config(config: &WidgetsConfig) -> Self {
        Self {
            paths: config.paths(),
            extensions: config.config_extensions.clone(),
        }
    }

    fn parse(widget: &WidgetTypeName, path: &Path, ext: &str) -> Result<Attributes, WidgetError> {
        let invalid = |message: String| WidgetError::InvalidConfig {
            widget: widget.to_string(),
            path: path.to_path_buf(),
            message,
        };

        let format = ConfigFormat::from_extension(ext)
            .ok_or_else(|| invalid(format!("unsupported configuration format '{}'", ext)))?;
        let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let value: Value = match format {
            ConfigFormat::Toml => {
                let table: toml::Table = format.parse(&content).map_err(invalid)?;
                serde_json::to_value(table).map_err(|e| invalid(e.to_string()))?
            }
            ConfigFormat::Json | ConfigFormat::Yaml => format.parse(&content).map_err(invalid)?,
        };

        Attributes::from_json(value).ok_or_else(|| invalid("expected a key/value mapping".to_string()))
    }
}

impl ConfigSource for FsConfigSource {
    fn load(&self, widget: &WidgetTypeName) -> Result<Option<Attributes>, WidgetError> {
        let Some(paths) = &self.paths else {
            return Ok(None);
        };

        for ext in &self.extensions {
            let path = paths.config_file(widget, ext);
            if path.is_file() {
                tracing::debug!(widget = %widget, path = %path.display(), "reading widget configuration");
                return Self::parse(widget, &path, ext).map(Some);
            }
        }
        Ok(None)
    }
}

/// Configuration held in memory, for embedded widgets and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigSource {
    configs: HashMap<WidgetTypeName, Attributes>,
}

impl StaticConfigSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the defaults for a widget.
    pub fn with(mut self, widget: WidgetTypeName, defaults: Attributes) -> Self {
        self.configs.insert(widget, defaults);
        self
    }
}

impl ConfigSource for StaticConfigSource {
    fn load(&self, widget: &WidgetTypeName) -> Result<Option<Attributes>, WidgetError> {
        Ok(self.configs.get(widget).cloned())
    }
}

/// Loads configuration through a [`ConfigSource`], caching per widget type
/// unless the reload policy asks for fresh reads.
pub struct ConfigLoader {
    source: Box<dyn ConfigSource>,
    reload: ReloadPolicy,
    cache: RwLock<HashMap<WidgetTypeName, Attributes>>,
}

impl ConfigLoader {
    /// Create a loader.
    pub fn new(source: impl ConfigSource + 'static, reload: ReloadPolicy) -> Self {
        Self {
            source: Box::new(source),
            reload,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Defaults for `widget`; empty when it has no configuration.
    pub fn load(&self, widget: &WidgetTypeName) -> Result<Attributes, WidgetError> {
        if self.reload == ReloadPolicy::Cached {
            if let Some(cached) = self.cache.read().get(widget) {
                return Ok(cached.clone());
            }
        }

        let defaults = self.source.load(widget)?.unwrap_or_default();
        if self.reload == ReloadPolicy::Cached {
            self.cache.write().insert(widget.clone(), defaults.clone());
        }
        Ok(defaults)
    }
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("reload", &self.reload)
            .field("cached", &self.cache.read().len())
            .finish()
    }
}
