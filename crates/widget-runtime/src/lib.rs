//! Widget registry, lifecycle and render helper.
//!
//! A widget type `sidebar` lives in `<widgets_root>/sidebar/`:
//!
//! ```text
//! sidebar/sidebar_widget.rs     widget source
//! sidebar/_sidebar_widget.html  widget partial
//! sidebar/sidebar.toml          configuration defaults
//! ```
//!
//! The [`WidgetRegistry`] loads the source on first use and resolves the
//! `SidebarWidget` class. Every render creates a fresh [`WidgetInstance`]:
//! configuration defaults first, then options, then permanent state. The
//! [`WidgetHelper`] runs the before-render lifecycle and hands the widget's
//! partial to a [`TemplateEngine`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use widget_core::{Attributes, ControllerContext, RequestContext, WidgetError, WidgetsConfig};
//! use widget_runtime::prelude::*;
//! use widget_session::{MemorySession, StateScope};
//!
//! struct CounterWidget;
//!
//! impl Widget for CounterWidget {
//!     fn before_render(&mut self, widget: &mut WidgetCore) -> Result<(), WidgetError> {
//!         let count = widget.state(StateScope::Permanent).update(|state| {
//!             let count = state.get("count").and_then(|v| v.as_i64()).unwrap_or(0) + 1;
//!             state.insert("count".into(), count.into());
//!             count
//!         })?;
//!         widget.set_attribute("count", count);
//!         Ok(())
//!     }
//! }
//!
//! impl WidgetType for CounterWidget {
//!     const CLASS_NAME: &'static str = "CounterWidget";
//!
//!     fn build(_attributes: &Attributes) -> Result<Self, WidgetError> {
//!         Ok(CounterWidget)
//!     }
//! }
//!
//! let mut catalog = WidgetCatalog::new();
//! catalog.register::<CounterWidget>().unwrap();
//! let registry = WidgetRegistry::new(WidgetsConfig::default(), EmbeddedSourceLoader::new(catalog));
//!
//! let engine = |_view: &dyn WidgetView, _partial: &str, locals: &Locals| -> Result<String, WidgetError> {
//!     let counter = locals["counter"].as_widget().unwrap();
//!     Ok(format!("{}", counter.attribute("count").unwrap()))
//! };
//!
//! let request = RequestContext::new(http::Method::GET, "/")
//!     .with_session(Arc::new(MemorySession::new()));
//! let helper = WidgetHelper::new(&registry, &engine, Arc::new(request), Arc::new(ControllerContext::default()));
//!
//! assert_eq!(helper.render_widget("counter", Attributes::new()).unwrap(), "1");
//! ```

mod config_loader;
mod helper;
mod instance;
mod loader;
mod observe;
mod registry;
mod widget;

pub use config_loader::{ConfigLoader, ConfigSource, FsConfigSource, StaticConfigSource};
pub use helper::{Local, Locals, TemplateEngine, WidgetHelper, WidgetView, WIDGET_LOCAL, WIDGET_NAME_ATTRIBUTE};
pub use instance::{WidgetCore, WidgetInstance, WidgetOptions, IDENTIFIER_ATTRIBUTE};
pub use loader::{EmbeddedSourceLoader, FsSourceLoader, SourceLoader};
pub use registry::WidgetRegistry;
pub use widget::{Definition, PlainWidget, Widget, WidgetCatalog, WidgetClass, WidgetFactory, WidgetType};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        EmbeddedSourceLoader, FsSourceLoader, Locals, TemplateEngine, Widget, WidgetCatalog, WidgetCore,
        WidgetHelper, WidgetInstance, WidgetOptions, WidgetRegistry, WidgetType, WidgetView,
    };
}
