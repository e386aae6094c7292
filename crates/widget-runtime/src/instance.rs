//! Widget instances and the before-render lifecycle.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use widget_core::{
    paths, Attributes, ControllerContext, LifecyclePhase, PermanentStatePolicy, RequestContext,
    WidgetError, WidgetIdentifier, WidgetTypeName,
};
use widget_session::{StateMap, StatePartition, StateScope, StateSlot};

use crate::observe::Observers;
use crate::widget::{Widget, WidgetClass};

/// Attribute holding the instance identifier.
pub const IDENTIFIER_ATTRIBUTE: &str = "identifier";

/// Options a widget is created with.
#[derive(Debug, Clone)]
pub struct WidgetOptions {
    /// Attributes provisioned on top of configuration defaults.
    pub attributes: Attributes,
    /// Current request; carries the session.
    pub request: Arc<RequestContext>,
    /// Current controller.
    pub controller: Arc<ControllerContext>,
}

impl WidgetOptions {
    /// Options with no attributes.
    pub fn new(request: Arc<RequestContext>, controller: Arc<ControllerContext>) -> Self {
        Self {
            attributes: Attributes::new(),
            request,
            controller,
        }
    }

    /// Add an attribute.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.set(name, value);
        self
    }

    /// Add several attributes.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        for (name, value) in attributes {
            self.attributes.set(name, value);
        }
        self
    }

    /// Set the instance identifier.
    pub fn identifier(self, id: impl Into<String>) -> Self {
        self.with(IDENTIFIER_ATTRIBUTE, id.into())
    }
}

/// Everything a widget instance owns apart from its behaviour.
///
/// This is what `before_render` hooks receive and what templates read.
pub struct WidgetCore {
    widget: WidgetTypeName,
    attributes: Attributes,
    request: Arc<RequestContext>,
    controller: Arc<ControllerContext>,
    views_folder: String,
}

impl WidgetCore {
    /// The widget type.
    pub fn widget_name(&self) -> &WidgetTypeName {
        &self.widget
    }

    /// All provisioned attributes.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Read an attribute.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Read a string attribute.
    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attributes.get_str(name)
    }

    /// Assign an attribute, creating its accessor if needed.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.set(name, value);
    }

    /// Provision an accessor; see [`Attributes::ensure_accessor`].
    pub fn ensure_accessor(&mut self, name: &str, value: Option<Value>) -> bool {
        self.attributes.ensure_accessor(name, value)
    }

    /// The instance identifier; `default` unless an `identifier` accessor exists.
    pub fn identifier(&self) -> WidgetIdentifier {
        WidgetIdentifier::from_attribute(self.attributes.get(IDENTIFIER_ATTRIBUTE))
    }

    /// The current request.
    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    /// The current controller.
    pub fn controller(&self) -> &ControllerContext {
        &self.controller
    }

    /// State partition for this instance's (type, identifier).
    pub fn partition(&self) -> StatePartition<'_> {
        let session = self.request.session().map(|session| &**session);
        StatePartition::new(&self.widget, self.identifier(), session)
    }

    /// Handle on one of the state slots.
    pub fn state(&self, scope: StateScope) -> StateSlot<'_> {
        self.partition().slot(scope)
    }

    /// Page-scope state.
    pub fn page_state(&self) -> Result<StateMap, WidgetError> {
        self.partition().read_state(StateScope::Page)
    }

    /// Permanent-scope state.
    pub fn permanent_state(&self) -> Result<StateMap, WidgetError> {
        self.partition().read_state(StateScope::Permanent)
    }

    /// Discard all permanent state for this (type, identifier).
    pub fn clean_permanent_state(&self) -> Result<(), WidgetError> {
        self.partition().clear_permanent_state()
    }

    /// View-relative folder of this widget's partials (`widgets/<type>`).
    pub fn self_folder(&self) -> String {
        paths::self_folder(&self.views_folder, &self.widget)
    }
}

impl fmt::Debug for WidgetCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetCore")
            .field("widget", &self.widget)
            .field("attributes", &self.attributes)
            .field("request", &self.request.request_id)
            .finish()
    }
}

/// A widget created for a single render.
///
/// Dereferences to [`WidgetCore`] for attribute and state access.
pub struct WidgetInstance {
    core: WidgetCore,
    behavior: Box<dyn Widget>,
    class: WidgetClass,
    observers: Observers,
}

impl WidgetInstance {
    /// Build an instance: provision configuration defaults, then options,
    /// then create permanent state according to `policy`.
    pub(crate) fn construct(
        widget: WidgetTypeName,
        class: WidgetClass,
        defaults: Attributes,
        options: WidgetOptions,
        views_folder: &str,
        policy: PermanentStatePolicy,
        observers: Observers,
    ) -> Result<Self, WidgetError> {
        let started = Instant::now();

        let mut attributes = Attributes::new();
        for (name, value) in defaults {
            attributes.ensure_accessor(&name, Some(value));
        }
        for (name, value) in options.attributes {
            attributes.ensure_accessor(&name, Some(value));
        }

        let behavior = class.instantiate(&attributes)?;
        let instance = Self {
            core: WidgetCore {
                widget,
                attributes,
                request: options.request,
                controller: options.controller,
                views_folder: views_folder.to_string(),
            },
            behavior,
            class,
            observers,
        };
        instance.notify(LifecyclePhase::Constructed, started);

        let partition = instance.core.partition();
        match policy {
            PermanentStatePolicy::Reset => partition.create_state(StateScope::Permanent)?,
            PermanentStatePolicy::Preserve => {
                partition.create_state_if_absent(StateScope::Permanent)?;
            }
        }
        instance.notify(LifecyclePhase::PermanentStateCreated, started);

        Ok(instance)
    }

    /// Run the before-render lifecycle:
    ///
    /// 1. reset page state,
    /// 2. call the widget's `before_render` hook,
    /// 3. write every field the widget exports into its attributes, unless
    ///    the hook assigned that attribute itself.
    pub fn before_render_call(&mut self) -> Result<(), WidgetError> {
        let started = Instant::now();
        let result = self.run_before_render(started);
        if let Err(err) = &result {
            self.notify(LifecyclePhase::Failed(err.to_string()), started);
        }
        result
    }

    fn run_before_render(&mut self, started: Instant) -> Result<(), WidgetError> {
        self.core.partition().create_state(StateScope::Page)?;
        self.notify(LifecyclePhase::PageStateCreated, started);

        let provisioned = self.core.attributes.clone();
        self.behavior.before_render(&mut self.core)?;
        self.notify(LifecyclePhase::BeforeRender, started);

        // Exported fields are the widget's own values, falsy ones included.
        // An attribute the hook assigned directly keeps the hook's value.
        for (name, value) in self.behavior.attributes() {
            let assigned_by_hook = self.core.attributes.get(&name) != provisioned.get(&name);
            if !assigned_by_hook {
                self.core.attributes.set(name, value);
            }
        }
        self.notify(LifecyclePhase::AccessorsProvisioned, started);

        Ok(())
    }

    /// Name of the class this instance was built from.
    pub fn class_name(&self) -> &str {
        self.class.name()
    }

    pub(crate) fn notify(&self, phase: LifecyclePhase, started: Instant) {
        self.observers.notify(self.core.widget.as_str(), phase, started);
    }
}

impl Deref for WidgetInstance {
    type Target = WidgetCore;

    fn deref(&self) -> &WidgetCore {
        &self.core
    }
}

impl DerefMut for WidgetInstance {
    fn deref_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }
}

impl fmt::Debug for WidgetInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetInstance")
            .field("class", &self.class.name())
            .field("core", &self.core)
            .finish()
    }
}
