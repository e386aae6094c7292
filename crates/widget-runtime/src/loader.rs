//! Widget source loaders.
//!
//! Widget code is compiled into the application and registered in a
//! [`WidgetCatalog`]. A loader decides whether a widget's source is available
//! and returns what loading it defines.

use std::path::Path;

use widget_core::{WidgetError, WidgetTypeName};

use crate::widget::{Definition, WidgetCatalog};

/// Loads the source of a widget type.
pub trait SourceLoader: Send + Sync {
    /// Load the source at `path` and return the symbols it defines.
    ///
    /// Loading must be idempotent: loading the same source twice defines the
    /// same symbols.
    fn load(&self, path: &Path, widget: &WidgetTypeName) -> Result<Vec<(String, Definition)>, WidgetError>;
}

/// Loads widgets whose conventional source file exists on disk.
///
/// The file itself is not interpreted; its presence is what makes the
/// catalog's definitions for that widget available.
#[derive(Debug, Clone, Default)]
pub struct FsSourceLoader {
    catalog: WidgetCatalog,
}

impl FsSourceLoader {
    /// Create a loader backed by a catalog.
    pub fn new(catalog: WidgetCatalog) -> Self {
        Self { catalog }
    }

    /// The backing catalog.
    pub fn catalog(&self) -> &WidgetCatalog {
        &self.catalog
    }
}

impl SourceLoader for FsSourceLoader {
    fn load(&self, path: &Path, widget: &WidgetTypeName) -> Result<Vec<(String, Definition)>, WidgetError> {
        if !path.is_file() {
            return Err(WidgetError::SourceNotFound {
                widget: widget.to_string(),
                path: path.to_path_buf(),
            });
        }
        Ok(self.catalog.definitions(widget).to_vec())
    }
}

/// Loads widgets straight from the catalog without touching the filesystem.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedSourceLoader {
    catalog: WidgetCatalog,
}

impl EmbeddedSourceLoader {
    /// Create a loader backed by a catalog.
    pub fn new(catalog: WidgetCatalog) -> Self {
        Self { catalog }
    }

    /// The backing catalog.
    pub fn catalog(&self) -> &WidgetCatalog {
        &self.catalog
    }
}

impl SourceLoader for EmbeddedSourceLoader {
    fn load(&self, path: &Path, widget: &WidgetTypeName) -> Result<Vec<(String, Definition)>, WidgetError> {
        if !self.catalog.contains(widget) {
            return Err(WidgetError::SourceNotFound {
                widget: widget.to_string(),
                path: path.to_path_buf(),
            });
        }
        Ok(self.catalog.definitions(widget).to_vec())
    }
}
