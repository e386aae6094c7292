//! Widget behaviour and class definitions.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use widget_core::{Attributes, WidgetError, WidgetTypeName};

use crate::instance::WidgetCore;

/// Behaviour of a widget kind.
///
/// Both methods are optional. A widget without behaviour renders with just
/// its configuration defaults and options.
pub trait Widget {
    /// Runs once per render, after page state was reset and before the
    /// partial is handed to the template engine.
    ///
    /// The hook may read and write page or permanent state and set further
    /// attributes on the instance.
    fn before_render(&mut self, widget: &mut WidgetCore) -> Result<(), WidgetError> {
        let _ = widget;
        Ok(())
    }

    /// Typed fields to expose to templates.
    ///
    /// Called after [`before_render`](Self::before_render); every entry is
    /// assigned to the instance's attributes, `false` and `null` included.
    /// Attributes the hook set through [`WidgetCore::set_attribute`] win.
    fn attributes(&self) -> Attributes {
        Attributes::new()
    }
}

/// A widget implemented as a Rust type.
///
/// # Example
///
/// ```rust
/// use widget_core::{Attributes, WidgetError};
/// use widget_runtime::{Widget, WidgetCore, WidgetType};
///
/// struct CounterWidget;
///
/// impl Widget for CounterWidget {
///     fn before_render(&mut self, widget: &mut WidgetCore) -> Result<(), WidgetError> {
///         widget.state(widget_session::StateScope::Permanent).update(|state| {
///             let count = state.get("count").and_then(|v| v.as_i64()).unwrap_or(0);
///             state.insert("count".into(), (count + 1).into());
///         })
///     }
/// }
///
/// impl WidgetType for CounterWidget {
///     const CLASS_NAME: &'static str = "CounterWidget";
///
///     fn build(_attributes: &Attributes) -> Result<Self, WidgetError> {
///         Ok(CounterWidget)
///     }
/// }
/// ```
pub trait WidgetType: Widget + Sized + 'static {
    /// Conventional class name, `<Camelized type>Widget`.
    const CLASS_NAME: &'static str;

    /// Build the widget from its provisioned attributes.
    fn build(attributes: &Attributes) -> Result<Self, WidgetError>;
}

/// A widget with no behaviour of its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainWidget;

impl Widget for PlainWidget {}

/// Constructor stored for a widget class.
pub type WidgetFactory = fn(&Attributes) -> Result<Box<dyn Widget>, WidgetError>;

fn build_boxed<W: WidgetType>(attributes: &Attributes) -> Result<Box<dyn Widget>, WidgetError> {
    Ok(Box::new(W::build(attributes)?))
}

fn build_plain(_attributes: &Attributes) -> Result<Box<dyn Widget>, WidgetError> {
    Ok(Box::new(PlainWidget))
}

/// A loadable widget class: its name plus a constructor.
#[derive(Clone)]
pub struct WidgetClass {
    name: Arc<str>,
    factory: WidgetFactory,
}

impl WidgetClass {
    /// Create a class from a name and factory.
    pub fn new(name: impl Into<Arc<str>>, factory: WidgetFactory) -> Self {
        Self {
            name: name.into(),
            factory,
        }
    }

    /// Class for a [`WidgetType`].
    pub fn of<W: WidgetType>() -> Self {
        Self::new(W::CLASS_NAME, build_boxed::<W>)
    }

    /// Behaviour-less class for a widget type.
    pub fn plain(widget: &WidgetTypeName) -> Self {
        Self::new(widget.class_name(), build_plain)
    }

    /// Class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instantiate the widget behaviour.
    pub fn instantiate(&self, attributes: &Attributes) -> Result<Box<dyn Widget>, WidgetError> {
        (self.factory)(attributes)
    }
}

impl fmt::Debug for WidgetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetClass").field("name", &self.name).finish()
    }
}

/// Something a widget source defines under a symbol name.
#[derive(Debug, Clone)]
pub enum Definition {
    /// A widget class.
    Class(WidgetClass),
    /// Any other value (constants, helpers).
    Value(Value),
}

/// Compiled-in widget classes, grouped by the source that defines them.
///
/// Source loaders consult the catalog to learn what loading a widget's source
/// defines.
#[derive(Debug, Clone, Default)]
pub struct WidgetCatalog {
    sources: HashMap<WidgetTypeName, Vec<(String, Definition)>>,
}

impl WidgetCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed widget; its source is derived from the class name.
    pub fn register<W: WidgetType>(&mut self) -> Result<&mut Self, WidgetError> {
        let widget = WidgetTypeName::from_class_name(W::CLASS_NAME)?;
        Ok(self.define(widget, W::CLASS_NAME, Definition::Class(WidgetClass::of::<W>())))
    }

    /// Register a widget that has no behaviour.
    pub fn register_plain(&mut self, widget: &str) -> Result<&mut Self, WidgetError> {
        let widget = WidgetTypeName::new(widget)?;
        let class = WidgetClass::plain(&widget);
        let symbol = class.name().to_string();
        Ok(self.define(widget, symbol, Definition::Class(class)))
    }

    /// Record that the source of `widget` defines `symbol`.
    pub fn define(
        &mut self,
        widget: WidgetTypeName,
        symbol: impl Into<String>,
        definition: Definition,
    ) -> &mut Self {
        let symbol = symbol.into();
        let defs = self.sources.entry(widget).or_default();
        defs.retain(|(existing, _)| *existing != symbol);
        defs.push((symbol, definition));
        self
    }

    /// Whether a source for `widget` is known.
    pub fn contains(&self, widget: &WidgetTypeName) -> bool {
        self.sources.contains_key(widget)
    }

    /// Definitions produced by loading the source of `widget`.
    pub fn definitions(&self, widget: &WidgetTypeName) -> &[(String, Definition)] {
        self.sources.get(widget).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All widget types with a known source, sorted.
    pub fn widgets(&self) -> Vec<&WidgetTypeName> {
        let mut widgets: Vec<_> = self.sources.keys().collect();
        widgets.sort();
        widgets
    }
}
