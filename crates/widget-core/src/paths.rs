//! Widget folder layout.
//!
//! ```text
//! <widgets_root>/<type>/<type>_widget.<ext>     widget class source
//! <widgets_root>/<type>/_<type>_widget.<ext>    widget's own partial
//! <widgets_root>/<type>/<type>.<config-ext>     optional configuration
//! ```

use std::path::{Path, PathBuf};

use crate::WidgetTypeName;

/// Resolves conventional file locations under a widgets root folder.
#[derive(Debug, Clone)]
pub struct WidgetPaths {
    root: PathBuf,
}

impl WidgetPaths {
    /// Create a resolver for the given widgets root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The widgets root folder.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder holding everything belonging to one widget type.
    pub fn widget_dir(&self, widget: &WidgetTypeName) -> PathBuf {
        self.root.join(widget.as_str())
    }

    /// `<root>/<type>/<type>_widget.<ext>`
    pub fn source_file(&self, widget: &WidgetTypeName, ext: &str) -> PathBuf {
        self.widget_dir(widget)
            .join(format!("{}_widget.{}", widget, ext))
    }

    /// `<root>/<type>/_<type>_widget.<ext>`
    pub fn partial_file(&self, widget: &WidgetTypeName, ext: &str) -> PathBuf {
        self.widget_dir(widget)
            .join(format!("_{}_widget.{}", widget, ext))
    }

    /// `<root>/<type>/<type>.<ext>`
    pub fn config_file(&self, widget: &WidgetTypeName, ext: &str) -> PathBuf {
        self.widget_dir(widget).join(format!("{}.{}", widget, ext))
    }
}

/// Folder, relative to the view root, holding a widget's own partials.
pub fn self_folder(views_folder: &str, widget: &WidgetTypeName) -> String {
    join_partial(views_folder, widget.as_str())
}

/// Partial name the render helper uses for a widget (`widgets/<type>/<type>_widget`).
pub fn widget_partial(views_folder: &str, widget: &WidgetTypeName) -> String {
    join_partial(&self_folder(views_folder, widget), &format!("{}_widget", widget))
}

/// Join partial path segments with `/`, independent of the host platform.
pub fn join_partial(base: &str, name: &str) -> String {
    let base = base.trim_end_matches('/');
    let name = name.trim_start_matches('/');
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", base, name)
    }
}
