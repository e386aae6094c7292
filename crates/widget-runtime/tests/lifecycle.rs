//! End-to-end widget lifecycle tests: registry, instance, session state and
//! render helper together.

use std::cell::RefCell;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{json, Value};
use widget_core::{
    Attributes, ControllerContext, ErrorKind, LifecycleObserver, LifecyclePhase, PermanentStatePolicy,
    RequestContext, ReloadPolicy, SessionStore, WidgetError, WidgetTypeName, WidgetsConfig,
};
use widget_runtime::{
    Definition, EmbeddedSourceLoader, FsSourceLoader, Locals, SourceLoader, TemplateEngine, Widget,
    WidgetCatalog, WidgetCore, WidgetHelper, WidgetRegistry, WidgetType, WidgetView,
};
use widget_session::{MemorySession, StateScope};

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<(String, LifecyclePhase)>>,
}

impl RecordingObserver {
    fn phases(&self, widget: &str) -> Vec<LifecyclePhase> {
        self.events
            .lock()
            .iter()
            .filter(|(name, _)| name == widget)
            .map(|(_, phase)| phase.clone())
            .collect()
    }
}

impl LifecycleObserver for RecordingObserver {
    fn on_phase(&self, widget: &str, phase: LifecyclePhase, _elapsed: Duration) {
        self.events.lock().push((widget.to_string(), phase));
    }
}

/// Records every partial it is asked to render, with a snapshot of the bound
/// widget's attributes and state.
#[derive(Default)]
struct RecordingEngine {
    calls: RefCell<Vec<RenderCall>>,
}

#[derive(Debug, Clone)]
struct RenderCall {
    partial: String,
    attributes: Attributes,
    page_state: Value,
    permanent_state: Value,
}

impl TemplateEngine for RecordingEngine {
    fn render_partial(&self, _view: &dyn WidgetView, partial: &str, locals: &Locals) -> Result<String, WidgetError> {
        let widget = locals
            .values()
            .find_map(|local| local.as_widget())
            .ok_or_else(|| WidgetError::render(partial, "no widget bound"))?;

        self.calls.borrow_mut().push(RenderCall {
            partial: partial.to_string(),
            attributes: widget.attributes().clone(),
            page_state: Value::Object(widget.page_state()?),
            permanent_state: Value::Object(widget.permanent_state()?),
        });
        Ok(format!("<div class=\"{}\"></div>", widget.widget_name()))
    }
}

struct CountingLoader {
    inner: EmbeddedSourceLoader,
    loads: Arc<AtomicUsize>,
}

impl SourceLoader for CountingLoader {
    fn load(&self, path: &Path, widget: &WidgetTypeName) -> Result<Vec<(String, Definition)>, WidgetError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(path, widget)
    }
}

// ---------------------------------------------------------------------------
// Widgets
// ---------------------------------------------------------------------------

struct CounterWidget;

impl Widget for CounterWidget {
    fn before_render(&mut self, widget: &mut WidgetCore) -> Result<(), WidgetError> {
        widget.state(StateScope::Permanent).update(|state| {
            let count = state.get("count").and_then(Value::as_i64).unwrap_or(0);
            state.insert("count".into(), json!(count + 1));
        })
    }
}

impl WidgetType for CounterWidget {
    const CLASS_NAME: &'static str = "CounterWidget";

    fn build(_attributes: &Attributes) -> Result<Self, WidgetError> {
        Ok(CounterWidget)
    }
}

/// Checks that page state was reset before its hook runs, then exports a
/// typed field.
struct BadgeWidget {
    label: String,
    hook_saw_empty_page: bool,
}

impl Widget for BadgeWidget {
    fn before_render(&mut self, widget: &mut WidgetCore) -> Result<(), WidgetError> {
        self.hook_saw_empty_page = widget.page_state()?.is_empty();
        widget.state(StateScope::Page).insert("visited", true)?;
        widget.set_attribute("hook_saw_empty_page", self.hook_saw_empty_page);
        Ok(())
    }

    fn attributes(&self) -> Attributes {
        Attributes::new().with("label", self.label.clone())
    }
}

impl WidgetType for BadgeWidget {
    const CLASS_NAME: &'static str = "BadgeWidget";

    fn build(attributes: &Attributes) -> Result<Self, WidgetError> {
        Ok(Self {
            label: attributes.get_str("label").unwrap_or("badge").to_uppercase(),
            hook_saw_empty_page: false,
        })
    }
}

/// Collapses itself in the hook and overrides its title through the core,
/// leaving the exported `title` field stale.
struct PanelWidget {
    collapsed: bool,
    title: String,
    note: Option<String>,
}

impl Widget for PanelWidget {
    fn before_render(&mut self, widget: &mut WidgetCore) -> Result<(), WidgetError> {
        self.collapsed = false;
        self.note = None;
        widget.set_attribute("title", "Assigned in hook");
        Ok(())
    }

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("collapsed", self.collapsed)
            .with("title", self.title.clone())
            .with("note", self.note.clone())
    }
}

impl WidgetType for PanelWidget {
    const CLASS_NAME: &'static str = "PanelWidget";

    fn build(attributes: &Attributes) -> Result<Self, WidgetError> {
        Ok(Self {
            collapsed: attributes.get_as("collapsed").map_err(anyhow::Error::from)?.unwrap_or(false),
            title: attributes.get_str("title").unwrap_or_default().to_string(),
            note: attributes.get_as("note").map_err(anyhow::Error::from)?,
        })
    }
}

struct FailingWidget;

impl Widget for FailingWidget {
    fn before_render(&mut self, _widget: &mut WidgetCore) -> Result<(), WidgetError> {
        Err(anyhow::anyhow!("upstream unavailable").into())
    }
}

impl WidgetType for FailingWidget {
    const CLASS_NAME: &'static str = "FailingWidget";

    fn build(_attributes: &Attributes) -> Result<Self, WidgetError> {
        Ok(FailingWidget)
    }
}

fn catalog() -> WidgetCatalog {
    let mut catalog = WidgetCatalog::new();
    catalog.register_plain("sidebar").unwrap();
    catalog.register::<CounterWidget>().unwrap();
    catalog.register::<BadgeWidget>().unwrap();
    catalog.register::<PanelWidget>().unwrap();
    catalog.register::<FailingWidget>().unwrap();
    catalog.define(
        WidgetTypeName::new("broken").unwrap(),
        "BrokenWidget",
        Definition::Value(json!("not a class")),
    );
    catalog
}

fn request(session: &Arc<MemorySession>) -> Arc<RequestContext> {
    Arc::new(RequestContext::new(http::Method::GET, "/").with_session(session.clone()))
}

fn controller() -> Arc<ControllerContext> {
    Arc::new(ControllerContext::new("pages", "show"))
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_sidebar_scenario() {
    let registry = WidgetRegistry::new(WidgetsConfig::default(), EmbeddedSourceLoader::new(catalog()));
    let engine = RecordingEngine::default();
    let session = Arc::new(MemorySession::new());
    let helper = WidgetHelper::new(&registry, &engine, request(&session), controller());

    let html = helper
        .render_widget("sidebar", Attributes::new().with("title", "My Shiny Sidebar"))
        .unwrap();
    assert_eq!(html, "<div class=\"sidebar\"></div>");

    let calls = engine.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].partial, "widgets/sidebar/sidebar_widget");
    assert_eq!(calls[0].attributes.get_str("title"), Some("My Shiny Sidebar"));
    assert_eq!(calls[0].page_state, json!({}));
    assert_eq!(calls[0].permanent_state, json!({}));

    assert_eq!(
        session.keys().unwrap(),
        vec!["widget_sidebar_default_page", "widget_sidebar_default_permanent"]
    );
}

#[test]
fn test_counter_is_reset_by_construction() {
    let registry = WidgetRegistry::new(WidgetsConfig::default(), EmbeddedSourceLoader::new(catalog()));
    let engine = RecordingEngine::default();
    let session = Arc::new(MemorySession::new());
    let helper = WidgetHelper::new(&registry, &engine, request(&session), controller());

    for _ in 0..3 {
        helper.render_widget("counter", Attributes::new()).unwrap();
    }

    let counts: Vec<_> = engine
        .calls
        .borrow()
        .iter()
        .map(|call| call.permanent_state["count"].clone())
        .collect();
    assert_eq!(counts, vec![json!(1), json!(1), json!(1)]);
    assert_eq!(
        session.get("widget_counter_default_permanent").unwrap(),
        Some(json!({"count": 1}))
    );
}

#[test]
fn test_counter_accumulates_when_preserved() {
    let config = WidgetsConfig::default().with_permanent_state(PermanentStatePolicy::Preserve);
    let registry = WidgetRegistry::new(config, EmbeddedSourceLoader::new(catalog()));
    let engine = RecordingEngine::default();
    let session = Arc::new(MemorySession::new());
    let helper = WidgetHelper::new(&registry, &engine, request(&session), controller());

    for _ in 0..3 {
        helper.render_widget("counter", Attributes::new()).unwrap();
    }

    assert_eq!(
        session.get("widget_counter_default_permanent").unwrap(),
        Some(json!({"count": 3}))
    );
}

#[test]
fn test_identifiers_partition_state() {
    let config = WidgetsConfig::default().with_permanent_state(PermanentStatePolicy::Preserve);
    let registry = WidgetRegistry::new(config, EmbeddedSourceLoader::new(catalog()));
    let engine = RecordingEngine::default();
    let session = Arc::new(MemorySession::new());
    let helper = WidgetHelper::new(&registry, &engine, request(&session), controller());

    helper
        .render_widget("counter", Attributes::new().with("identifier", "left"))
        .unwrap();
    helper
        .render_widget("counter", Attributes::new().with("identifier", "left"))
        .unwrap();
    helper
        .render_widget("counter", Attributes::new().with("identifier", "right"))
        .unwrap();

    assert_eq!(
        session.get("widget_counter_left_permanent").unwrap(),
        Some(json!({"count": 2}))
    );
    assert_eq!(
        session.get("widget_counter_right_permanent").unwrap(),
        Some(json!({"count": 1}))
    );
    assert!(!session.exists("widget_counter_default_permanent").unwrap());
}

#[test]
fn test_missing_source_renders_nothing() {
    let registry = WidgetRegistry::new(WidgetsConfig::default(), EmbeddedSourceLoader::new(catalog()));
    let engine = RecordingEngine::default();
    let session = Arc::new(MemorySession::new());
    let helper = WidgetHelper::new(&registry, &engine, request(&session), controller());

    let err = helper.render_widget("nonexistent", Attributes::new()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::LoadFailure);
    assert!(err.to_string().contains("nonexistent"));
    assert!(engine.calls.borrow().is_empty());
    assert!(session.is_empty());
}

#[test]
fn test_unconfigured_root_fails_before_loading() {
    let loads = Arc::new(AtomicUsize::new(0));
    let loader = CountingLoader {
        inner: EmbeddedSourceLoader::new(catalog()),
        loads: loads.clone(),
    };
    let registry = WidgetRegistry::new(WidgetsConfig::default().without_root(), loader);
    let engine = RecordingEngine::default();
    let session = Arc::new(MemorySession::new());
    let helper = WidgetHelper::new(&registry, &engine, request(&session), controller());

    let err = helper.render_widget("sidebar", Attributes::new()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(loads.load(Ordering::SeqCst), 0);
    assert!(engine.calls.borrow().is_empty());
    assert!(session.is_empty());
}

#[test]
fn test_missing_session_is_configuration_error() {
    let registry = WidgetRegistry::new(WidgetsConfig::default(), EmbeddedSourceLoader::new(catalog()));
    let engine = RecordingEngine::default();
    let request = Arc::new(RequestContext::new(http::Method::GET, "/"));
    let helper = WidgetHelper::new(&registry, &engine, request, controller());

    let err = helper.render_widget("sidebar", Attributes::new()).unwrap_err();
    assert!(matches!(err, WidgetError::SessionUnavailable { .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_non_class_symbol_is_type_mismatch() {
    let registry = WidgetRegistry::new(WidgetsConfig::default(), EmbeddedSourceLoader::new(catalog()));
    let engine = RecordingEngine::default();
    let session = Arc::new(MemorySession::new());
    let helper = WidgetHelper::new(&registry, &engine, request(&session), controller());

    let err = helper.render_widget("broken", Attributes::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert!(err.to_string().contains("BrokenWidget"));
}

#[test]
fn test_hook_order_and_exported_attributes() {
    let observer = Arc::new(RecordingObserver::default());
    let registry = WidgetRegistry::new(WidgetsConfig::default(), EmbeddedSourceLoader::new(catalog()))
        .with_observer(observer.clone());
    let engine = RecordingEngine::default();
    let session = Arc::new(MemorySession::new());
    let helper = WidgetHelper::new(&registry, &engine, request(&session), controller());

    // Stale page state from an earlier request.
    session
        .set("widget_badge_default_page", json!({"visited": "stale", "other": 1}))
        .unwrap();

    helper
        .render_widget("badge", Attributes::new().with("label", "links"))
        .unwrap();

    assert_eq!(
        observer.phases("badge"),
        vec![
            LifecyclePhase::Loaded,
            LifecyclePhase::Constructed,
            LifecyclePhase::PermanentStateCreated,
            LifecyclePhase::PageStateCreated,
            LifecyclePhase::BeforeRender,
            LifecyclePhase::AccessorsProvisioned,
            LifecyclePhase::Rendered,
        ]
    );

    let calls = engine.calls.borrow();
    let call = &calls[0];
    assert_eq!(call.attributes.get("hook_saw_empty_page"), Some(&json!(true)));
    // Exported fields are assigned over the options they were built from.
    assert_eq!(call.attributes.get_str("label"), Some("LINKS"));
    assert_eq!(call.page_state, json!({"visited": true}));
}

#[test]
fn test_exported_attribute_without_option() {
    let registry = WidgetRegistry::new(WidgetsConfig::default(), EmbeddedSourceLoader::new(catalog()));
    let engine = RecordingEngine::default();
    let session = Arc::new(MemorySession::new());
    let helper = WidgetHelper::new(&registry, &engine, request(&session), controller());

    helper.render_widget("badge", Attributes::new()).unwrap();

    assert_eq!(engine.calls.borrow()[0].attributes.get_str("label"), Some("BADGE"));
}

#[test]
fn test_exported_falsy_fields_reach_template() {
    let registry = WidgetRegistry::new(WidgetsConfig::default(), EmbeddedSourceLoader::new(catalog()));
    let engine = RecordingEngine::default();
    let session = Arc::new(MemorySession::new());
    let helper = WidgetHelper::new(&registry, &engine, request(&session), controller());

    helper
        .render_widget(
            "panel",
            Attributes::new()
                .with("collapsed", true)
                .with("title", "From options")
                .with("note", "remember"),
        )
        .unwrap();

    let calls = engine.calls.borrow();
    let attributes = &calls[0].attributes;
    assert_eq!(attributes.get("collapsed"), Some(&json!(false)));
    assert_eq!(attributes.get("note"), Some(&Value::Null));
    assert_eq!(attributes.get_str("title"), Some("Assigned in hook"));
}

#[test]
fn test_failing_hook_aborts_render() {
    let observer = Arc::new(RecordingObserver::default());
    let registry = WidgetRegistry::new(WidgetsConfig::default(), EmbeddedSourceLoader::new(catalog()))
        .with_observer(observer.clone());
    let engine = RecordingEngine::default();
    let session = Arc::new(MemorySession::new());
    let helper = WidgetHelper::new(&registry, &engine, request(&session), controller());

    let err = helper.render_widget("failing", Attributes::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Hook);
    assert!(engine.calls.borrow().is_empty());
    assert!(matches!(
        observer.phases("failing").last(),
        Some(LifecyclePhase::Failed(message)) if message.contains("upstream unavailable")
    ));

    // Other widgets still render.
    helper.render_widget("sidebar", Attributes::new()).unwrap();
    assert_eq!(engine.calls.borrow().len(), 1);
}

#[test]
fn test_reload_policy() {
    for (policy, expected) in [(ReloadPolicy::Cached, 1), (ReloadPolicy::Always, 3)] {
        let loads = Arc::new(AtomicUsize::new(0));
        let loader = CountingLoader {
            inner: EmbeddedSourceLoader::new(catalog()),
            loads: loads.clone(),
        };
        let registry = WidgetRegistry::new(WidgetsConfig::default().with_reload(policy), loader);
        let engine = RecordingEngine::default();
        let session = Arc::new(MemorySession::new());
        let helper = WidgetHelper::new(&registry, &engine, request(&session), controller());

        for _ in 0..3 {
            helper.render_widget("sidebar", Attributes::new()).unwrap();
        }
        assert_eq!(loads.load(Ordering::SeqCst), expected, "{policy:?}");
    }
}

#[test]
fn test_filesystem_widgets_with_config() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("sidebar");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("sidebar_widget.rs"), "// sidebar widget").unwrap();
    std::fs::write(dir.join("sidebar.toml"), "title = \"Links\"\nlimit = 5\n").unwrap();

    let registry = WidgetRegistry::new(WidgetsConfig::new(root.path()), FsSourceLoader::new(catalog()));
    let engine = RecordingEngine::default();
    let session = Arc::new(MemorySession::new());
    let helper = WidgetHelper::new(&registry, &engine, request(&session), controller());

    helper
        .render_widget("sidebar", Attributes::new().with("limit", 10))
        .unwrap();
    {
        let calls = engine.calls.borrow();
        assert_eq!(calls[0].attributes.get_str("title"), Some("Links"));
        assert_eq!(calls[0].attributes.get("limit"), Some(&json!(10)));
    }

    // The counter is in the catalog but has no source file on disk.
    let err = helper.render_widget("counter", Attributes::new()).unwrap_err();
    assert!(matches!(err, WidgetError::SourceNotFound { .. }));
}

#[test]
fn test_clean_permanent_state_from_hook_view() {
    let registry = WidgetRegistry::new(WidgetsConfig::default(), EmbeddedSourceLoader::new(catalog()));
    let session = Arc::new(MemorySession::new());

    let options = widget_runtime::WidgetOptions::new(request(&session), controller());
    let counter = registry.create("counter", options).unwrap();
    counter
        .state(StateScope::Permanent)
        .insert("count", 7)
        .unwrap();
    counter.clean_permanent_state().unwrap();

    assert_eq!(counter.permanent_state().unwrap().len(), 0);
}
