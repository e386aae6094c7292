//! Widget registry: resolves widget type names to loaded classes.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use widget_core::{
    LifecycleObserver, LifecyclePhase, ReloadPolicy, WidgetError, WidgetTypeName, WidgetsConfig,
};

use crate::config_loader::{ConfigLoader, ConfigSource, FsConfigSource};
use crate::instance::{WidgetInstance, WidgetOptions};
use crate::loader::SourceLoader;
use crate::observe::Observers;
use crate::widget::{Definition, WidgetClass};

#[derive(Debug, Default)]
struct LoadedWidgets {
    loaded: HashSet<WidgetTypeName>,
    symbols: HashMap<String, Definition>,
}

/// Process-wide registry of loaded widget types.
///
/// Construct one at startup and share it (e.g. behind an `Arc`) with every
/// request. Loading is idempotent and the loaded set sits behind a lock, so
/// concurrent first loads of the same widget only cost a redundant load.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use widget_core::{ControllerContext, RequestContext, WidgetsConfig};
/// use widget_runtime::{EmbeddedSourceLoader, WidgetCatalog, WidgetOptions, WidgetRegistry};
/// use widget_session::MemorySession;
///
/// let mut catalog = WidgetCatalog::new();
/// catalog.register_plain("sidebar").unwrap();
/// let registry = WidgetRegistry::new(WidgetsConfig::default(), EmbeddedSourceLoader::new(catalog));
///
/// let request = RequestContext::new(http::Method::GET, "/")
///     .with_session(Arc::new(MemorySession::new()));
/// let options = WidgetOptions::new(Arc::new(request), Arc::new(ControllerContext::default()))
///     .with("title", "My Shiny Sidebar");
///
/// let sidebar = registry.create("sidebar", options).unwrap();
/// assert_eq!(sidebar.attribute_str("title"), Some("My Shiny Sidebar"));
/// ```
pub struct WidgetRegistry {
    config: WidgetsConfig,
    loader: Box<dyn SourceLoader>,
    configs: ConfigLoader,
    observers: Observers,
    state: RwLock<LoadedWidgets>,
}

impl WidgetRegistry {
    /// Create a registry reading widget configuration from the widgets root.
    pub fn new(config: WidgetsConfig, loader: impl SourceLoader + 'static) -> Self {
        let configs = ConfigLoader::new(FsConfigSource::from_config(&config), config.reload);
        Self {
            config,
            loader: Box::new(loader),
            configs,
            observers: Observers::default(),
            state: RwLock::new(LoadedWidgets::default()),
        }
    }

    /// Replace the configuration source.
    pub fn with_config_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.configs = ConfigLoader::new(source, self.config.reload);
        self
    }

    /// Register a lifecycle observer.
    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// The runtime configuration.
    pub fn config(&self) -> &WidgetsConfig {
        &self.config
    }

    /// Whether `widget` has been loaded.
    pub fn is_loaded(&self, widget: &WidgetTypeName) -> bool {
        self.state.read().loaded.contains(widget)
    }

    /// All loaded widget types, sorted.
    pub fn loaded_widgets(&self) -> Vec<WidgetTypeName> {
        let mut loaded: Vec<_> = self.state.read().loaded.iter().cloned().collect();
        loaded.sort();
        loaded
    }

    /// Load the source of `widget` unless it is loaded and the reload policy
    /// allows reuse.
    pub fn load_widget(&self, widget: &WidgetTypeName) -> Result<(), WidgetError> {
        if self.config.reload == ReloadPolicy::Cached && self.is_loaded(widget) {
            tracing::trace!(widget = %widget, "widget already loaded");
            return Ok(());
        }

        let started = Instant::now();
        let paths = self
            .config
            .paths()
            .ok_or_else(|| WidgetError::RootNotConfigured {
                widget: widget.to_string(),
            })?;
        let path = paths.source_file(widget, &self.config.source_extension);

        tracing::debug!(widget = %widget, path = %path.display(), "loading widget source");
        let definitions = self.loader.load(&path, widget)?;

        let mut state = self.state.write();
        state.symbols.extend(definitions);
        state.loaded.insert(widget.clone());
        drop(state);

        self.observers.notify(widget.as_str(), LifecyclePhase::Loaded, started);
        Ok(())
    }

    /// Resolve a widget type name to its class, loading it if needed.
    pub fn resolve(&self, name: &str) -> Result<WidgetClass, WidgetError> {
        let widget = WidgetTypeName::new(name)?;
        self.resolve_type(&widget)
    }

    fn resolve_type(&self, widget: &WidgetTypeName) -> Result<WidgetClass, WidgetError> {
        self.load_widget(widget)?;

        let class_name = widget.class_name();
        match self.state.read().symbols.get(&class_name) {
            Some(Definition::Class(class)) => Ok(class.clone()),
            Some(Definition::Value(_)) => Err(WidgetError::NotAClass {
                widget: widget.to_string(),
                class: class_name,
            }),
            None => Err(WidgetError::ClassNotDefined {
                widget: widget.to_string(),
                class: class_name,
            }),
        }
    }

    /// Resolve `name` and construct an instance from `options`.
    pub fn create(&self, name: &str, options: WidgetOptions) -> Result<WidgetInstance, WidgetError> {
        let started = Instant::now();
        let result = WidgetTypeName::new(name).and_then(|widget| self.create_type(widget, options));

        if let Err(err) = &result {
            tracing::warn!(widget = name, error = %err, "failed to create widget");
            self.observers
                .notify(name, LifecyclePhase::Failed(err.to_string()), started);
        }
        result
    }

    fn create_type(&self, widget: WidgetTypeName, options: WidgetOptions) -> Result<WidgetInstance, WidgetError> {
        let class = self.resolve_type(&widget)?;
        let defaults = self.configs.load(&widget)?;

        WidgetInstance::construct(
            widget,
            class,
            defaults,
            options,
            &self.config.views_folder,
            self.config.permanent_state,
            self.observers.clone(),
        )
    }
}

impl std::fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetRegistry")
            .field("config", &self.config)
            .field("loaded", &self.loaded_widgets())
            .field("observers", &self.observers.len())
            .finish()
    }
}
