//! Widget lifecycle tracking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Lifecycle phases a widget goes through during one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Widget source was loaded into the registry.
    Loaded,
    /// Configuration and options were provisioned onto a new instance.
    Constructed,
    /// Permanent state slot was created (or reset).
    PermanentStateCreated,
    /// Page state slot was reset.
    PageStateCreated,
    /// The widget's `before_render` hook ran.
    BeforeRender,
    /// Accessors were provisioned for every exported attribute.
    AccessorsProvisioned,
    /// The template engine rendered the widget partial.
    Rendered,
    /// An error aborted the widget.
    Failed(String),
}

/// Observer trait for lifecycle events.
pub trait LifecycleObserver: Send + Sync {
    /// Called when a widget enters a lifecycle phase.
    fn on_phase(&self, widget: &str, phase: LifecyclePhase, elapsed: Duration);
}

/// Per-request timing of widget renders.
#[derive(Debug, Clone)]
pub struct TimingContext {
    start: Instant,
    marks: HashMap<String, Instant>,
}

impl TimingContext {
    /// Create a new timing context.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            marks: HashMap::new(),
        }
    }

    /// Record a timing mark.
    pub fn mark(&mut self, name: &str) {
        self.marks.insert(name.to_string(), Instant::now());
    }

    /// Mark the start of a widget render.
    pub fn mark_widget_start(&mut self, widget: &str) {
        self.mark(&format!("widget_{}_start", widget));
    }

    /// Mark the end of a widget render.
    pub fn mark_widget_rendered(&mut self, widget: &str) {
        self.mark(&format!("widget_{}_rendered", widget));
    }

    /// Get elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Timing for a rendered widget.
    ///
    /// A widget rendered several times reports its latest render.
    pub fn widget_timing(&self, widget: &str) -> Option<WidgetTiming> {
        let start = self.marks.get(&format!("widget_{}_start", widget))?;
        let rendered = self.marks.get(&format!("widget_{}_rendered", widget))?;

        Some(WidgetTiming {
            name: widget.to_string(),
            start: start.duration_since(self.start),
            rendered: rendered.duration_since(self.start),
            duration: rendered.saturating_duration_since(*start),
        })
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Timing information for a widget render.
#[derive(Debug, Clone)]
pub struct WidgetTiming {
    /// Widget type name.
    pub name: String,
    /// Time from request start to render start.
    pub start: Duration,
    /// Time from request start to render end.
    pub rendered: Duration,
    /// Duration of the render.
    pub duration: Duration,
}
