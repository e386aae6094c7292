//! Lifecycle observer fan-out.

use std::sync::Arc;
use std::time::Instant;

use widget_core::{LifecycleObserver, LifecyclePhase};

/// Registered lifecycle observers, shared by the registry and the instances
/// it creates.
#[derive(Clone, Default)]
pub(crate) struct Observers(Arc<Vec<Arc<dyn LifecycleObserver>>>);

impl Observers {
    pub(crate) fn push(&mut self, observer: Arc<dyn LifecycleObserver>) {
        Arc::make_mut(&mut self.0).push(observer);
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    /// Report `phase` for `widget`, timed from `started`.
    pub(crate) fn notify(&self, widget: &str, phase: LifecyclePhase, started: Instant) {
        let elapsed = started.elapsed();
        tracing::trace!(widget, phase = ?phase, elapsed_us = elapsed.as_micros() as u64, "widget lifecycle");
        for observer in self.0.iter() {
            observer.on_phase(widget, phase.clone(), elapsed);
        }
    }
}
