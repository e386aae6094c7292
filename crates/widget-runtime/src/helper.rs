//! Render helper: resolves, instantiates and renders widgets through a
//! template engine.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use serde_json::Value;
use widget_core::{
    paths, Attributes, ControllerContext, LifecyclePhase, RequestContext, TimingContext,
    WidgetError, WidgetTiming,
};

use crate::instance::{WidgetInstance, WidgetOptions};
use crate::registry::WidgetRegistry;

/// Option naming the widget being rendered.
pub const WIDGET_NAME_ATTRIBUTE: &str = "widget_name";

/// Local bound to the active widget in widget partials.
pub const WIDGET_LOCAL: &str = "widget";

/// A named local handed to the template engine.
#[derive(Debug, Clone)]
pub enum Local {
    /// A widget instance.
    Widget(Rc<WidgetInstance>),
    /// A plain value.
    Value(Value),
}

impl Local {
    /// The widget, if this local is one.
    pub fn as_widget(&self) -> Option<&WidgetInstance> {
        match self {
            Self::Widget(widget) => Some(widget),
            Self::Value(_) => None,
        }
    }

    /// The value, if this local is one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Widget(_) => None,
        }
    }
}

/// Locals passed to a partial, in insertion order.
pub type Locals = IndexMap<String, Local>;

/// Renders partials to markup.
///
/// `view` lets a partial render nested widgets or widget partials.
pub trait TemplateEngine {
    /// Render `partial` with `locals`.
    fn render_partial(
        &self,
        view: &dyn WidgetView,
        partial: &str,
        locals: &Locals,
    ) -> Result<String, WidgetError>;
}

impl<F> TemplateEngine for F
where
    F: Fn(&dyn WidgetView, &str, &Locals) -> Result<String, WidgetError>,
{
    fn render_partial(
        &self,
        view: &dyn WidgetView,
        partial: &str,
        locals: &Locals,
    ) -> Result<String, WidgetError> {
        self(view, partial, locals)
    }
}

/// View-side operations available to templates.
pub trait WidgetView {
    /// Render the widget `name` with `options`.
    fn render_widget(&self, name: &str, options: Attributes) -> Result<String, WidgetError>;

    /// Render `partial` from the active widget's folder.
    fn render_widget_partial(&self, partial: &str, locals: Attributes) -> Result<String, WidgetError>;

    /// The widget whose partial is being rendered, if any.
    fn current_widget(&self) -> Option<Rc<WidgetInstance>>;
}

/// Per-request render helper.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use widget_core::{Attributes, ControllerContext, RequestContext, WidgetError, WidgetsConfig};
/// use widget_runtime::{EmbeddedSourceLoader, Locals, WidgetCatalog, WidgetHelper, WidgetRegistry, WidgetView};
/// use widget_session::MemorySession;
///
/// let mut catalog = WidgetCatalog::new();
/// catalog.register_plain("sidebar").unwrap();
/// let registry = WidgetRegistry::new(WidgetsConfig::default(), EmbeddedSourceLoader::new(catalog));
///
/// let engine = |_view: &dyn WidgetView, partial: &str, locals: &Locals| -> Result<String, WidgetError> {
///     let title = locals["sidebar"].as_widget().and_then(|w| w.attribute_str("title")).unwrap_or("");
///     Ok(format!("<{partial}>{title}</{partial}>"))
/// };
///
/// let request = RequestContext::new(http::Method::GET, "/")
///     .with_session(Arc::new(MemorySession::new()));
/// let helper = WidgetHelper::new(&registry, &engine, Arc::new(request), Arc::new(ControllerContext::default()));
///
/// let html = helper.render_widget("sidebar", Attributes::new().with("title", "Links")).unwrap();
/// assert_eq!(html, "<widgets/sidebar/sidebar_widget>Links</widgets/sidebar/sidebar_widget>");
/// ```
pub struct WidgetHelper<'a, E: TemplateEngine + ?Sized> {
    registry: &'a WidgetRegistry,
    engine: &'a E,
    request: Arc<RequestContext>,
    controller: Arc<ControllerContext>,
    current: RefCell<Option<Rc<WidgetInstance>>>,
    timing: RefCell<TimingContext>,
}

impl<'a, E: TemplateEngine + ?Sized> WidgetHelper<'a, E> {
    /// Create a helper for one request.
    pub fn new(
        registry: &'a WidgetRegistry,
        engine: &'a E,
        request: Arc<RequestContext>,
        controller: Arc<ControllerContext>,
    ) -> Self {
        Self {
            registry,
            engine,
            request,
            controller,
            current: RefCell::new(None),
            timing: RefCell::new(TimingContext::new()),
        }
    }

    /// Render the widget `name`: create it, run the before-render
    /// lifecycle and render `widgets/<name>/<name>_widget` with the instance
    /// bound to `name`.
    pub fn render_widget(&self, name: &str, options: Attributes) -> Result<String, WidgetError> {
        let started = Instant::now();
        let options = WidgetOptions::new(self.request.clone(), self.controller.clone())
            .with_attributes(options)
            .with(WIDGET_NAME_ATTRIBUTE, name);

        let mut instance = self.registry.create(name, options)?;
        self.timing.borrow_mut().mark_widget_start(name);
        instance.before_render_call()?;

        let instance = Rc::new(instance);
        let partial = paths::widget_partial(&self.registry.config().views_folder, instance.widget_name());
        let mut locals = Locals::new();
        locals.insert(name.to_string(), Local::Widget(instance.clone()));

        tracing::debug!(widget = name, partial = %partial, "rendering widget");
        let previous = self.current.replace(Some(instance.clone()));
        let result = self.engine.render_partial(self, &partial, &locals);
        self.current.replace(previous);

        match &result {
            Ok(_) => {
                self.timing.borrow_mut().mark_widget_rendered(name);
                instance.notify(LifecyclePhase::Rendered, started);
            }
            Err(err) => {
                tracing::warn!(widget = name, error = %err, "widget render failed");
                instance.notify(LifecyclePhase::Failed(err.to_string()), started);
            }
        }
        result
    }

    /// Render `partial` from the active widget's folder with the widget bound
    /// to `widget` next to `locals`.
    pub fn render_widget_partial(&self, partial: &str, locals: Attributes) -> Result<String, WidgetError> {
        let current = self
            .current_widget()
            .ok_or_else(|| WidgetError::NoActiveWidget {
                partial: partial.to_string(),
            })?;
        let path = paths::join_partial(&current.self_folder(), partial);

        let mut locals: Locals = locals
            .into_iter()
            .map(|(name, value)| (name, Local::Value(value)))
            .collect();
        locals.insert(WIDGET_LOCAL.to_string(), Local::Widget(current));

        tracing::debug!(partial = %path, "rendering widget partial");
        self.engine.render_partial(self, &path, &locals)
    }

    /// The widget whose partial is being rendered, if any.
    pub fn current_widget(&self) -> Option<Rc<WidgetInstance>> {
        self.current.borrow().clone()
    }

    /// Time since the helper was created.
    pub fn elapsed(&self) -> std::time::Duration {
        self.timing.borrow().elapsed()
    }

    /// Timing of the latest render of `widget`.
    pub fn widget_timing(&self, widget: &str) -> Option<WidgetTiming> {
        self.timing.borrow().widget_timing(widget)
    }
}

impl<'a, E: TemplateEngine + ?Sized> WidgetView for WidgetHelper<'a, E> {
    fn render_widget(&self, name: &str, options: Attributes) -> Result<String, WidgetError> {
        WidgetHelper::render_widget(self, name, options)
    }

    fn render_widget_partial(&self, partial: &str, locals: Attributes) -> Result<String, WidgetError> {
        WidgetHelper::render_widget_partial(self, partial, locals)
    }

    fn current_widget(&self) -> Option<Rc<WidgetInstance>> {
        WidgetHelper::current_widget(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::EmbeddedSourceLoader;
    use crate::widget::WidgetCatalog;
    use widget_core::{ErrorKind, WidgetsConfig};
    use widget_session::MemorySession;

    /// Renders a widget partial as its name plus the bound widget's title,
    /// and expands `child` / `part` attributes of widget partials into nested
    /// renders.
    struct NestingEngine;

    impl TemplateEngine for NestingEngine {
        fn render_partial(
            &self,
            view: &dyn WidgetView,
            partial: &str,
            locals: &Locals,
        ) -> Result<String, WidgetError> {
            let widget = locals
                .values()
                .find_map(Local::as_widget)
                .ok_or_else(|| WidgetError::render(partial, "no widget local"))?;

            let mut out = format!("[{partial}:{}", widget.widget_name());
            if partial.ends_with("_widget") {
                if let Some(child) = widget.attribute_str("child") {
                    out.push_str(&view.render_widget(child, Attributes::new())?);
                }
                if let Some(part) = widget.attribute_str("part") {
                    out.push_str(&view.render_widget_partial(part, Attributes::new().with("x", 1))?);
                }
            }
            let current = view.current_widget().map(|w| w.widget_name().to_string());
            out.push_str(&format!("|{}]", current.unwrap_or_default()));
            Ok(out)
        }
    }

    fn registry() -> WidgetRegistry {
        let mut catalog = WidgetCatalog::new();
        catalog.register_plain("outer").unwrap();
        catalog.register_plain("inner").unwrap();
        WidgetRegistry::new(WidgetsConfig::default(), EmbeddedSourceLoader::new(catalog))
    }

    fn request() -> Arc<RequestContext> {
        Arc::new(RequestContext::new(http::Method::GET, "/").with_session(Arc::new(MemorySession::new())))
    }

    #[test]
    fn test_renders_conventional_partial() {
        let registry = registry();
        let helper = WidgetHelper::new(&registry, &NestingEngine, request(), Arc::new(ControllerContext::default()));

        let html = helper.render_widget("inner", Attributes::new()).unwrap();
        assert_eq!(html, "[widgets/inner/inner_widget:inner|inner]");
        assert!(helper.current_widget().is_none());
        assert!(helper.widget_timing("inner").is_some());
    }

    #[test]
    fn test_widget_name_option() {
        let registry = registry();
        let engine = |_view: &dyn WidgetView, _partial: &str, locals: &Locals| -> Result<String, WidgetError> {
            let widget = locals["inner"].as_widget().unwrap();
            Ok(widget.attribute_str(WIDGET_NAME_ATTRIBUTE).unwrap_or("").to_string())
        };
        let helper = WidgetHelper::new(&registry, &engine, request(), Arc::new(ControllerContext::default()));

        assert_eq!(helper.render_widget("inner", Attributes::new()).unwrap(), "inner");
    }

    #[test]
    fn test_nested_render_restores_current() {
        let registry = registry();
        let helper = WidgetHelper::new(&registry, &NestingEngine, request(), Arc::new(ControllerContext::default()));

        let html = helper
            .render_widget("outer", Attributes::new().with("child", "inner"))
            .unwrap();
        assert_eq!(
            html,
            "[widgets/outer/outer_widget:outer[widgets/inner/inner_widget:inner|inner]|outer]"
        );
    }

    #[test]
    fn test_widget_partial_uses_self_folder() {
        let registry = registry();
        let helper = WidgetHelper::new(&registry, &NestingEngine, request(), Arc::new(ControllerContext::default()));

        let html = helper
            .render_widget("outer", Attributes::new().with("part", "links"))
            .unwrap();
        assert_eq!(
            html,
            "[widgets/outer/outer_widget:outer[widgets/outer/links:outer|outer]|outer]"
        );
    }

    #[test]
    fn test_widget_partial_without_active_widget() {
        let registry = registry();
        let helper = WidgetHelper::new(&registry, &NestingEngine, request(), Arc::new(ControllerContext::default()));

        let err = helper.render_widget_partial("links", Attributes::new()).unwrap_err();
        assert!(matches!(err, WidgetError::NoActiveWidget { .. }));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_engine_error_propagates() {
        let registry = registry();
        let engine = |_view: &dyn WidgetView, partial: &str, _locals: &Locals| -> Result<String, WidgetError> {
            Err(WidgetError::render(partial, "syntax error"))
        };
        let helper = WidgetHelper::new(&registry, &engine, request(), Arc::new(ControllerContext::default()));

        let err = helper.render_widget("inner", Attributes::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Render);
        assert!(helper.current_widget().is_none());
        assert!(helper.widget_timing("inner").is_none());
    }

    #[test]
    fn test_unknown_widget_never_reaches_engine() {
        let registry = registry();
        let engine = |_view: &dyn WidgetView, _partial: &str, _locals: &Locals| -> Result<String, WidgetError> {
            panic!("engine must not be called");
        };
        let helper = WidgetHelper::new(&registry, &engine, request(), Arc::new(ControllerContext::default()));

        let err = helper.render_widget("missing", Attributes::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LoadFailure);
    }
}
