//! Core abstractions for session-stateful server-rendered widgets.
//!
//! This crate provides the fundamental types shared by the runtime:
//! - `WidgetTypeName` / `WidgetIdentifier` - Naming conventions
//! - `Attributes` - Per-instance accessors
//! - `WidgetsConfig` - Runtime configuration
//! - `RequestContext` / `ControllerContext` - Host context
//! - `SessionStore` - Host session contract
//! - `LifecyclePhase` - Widget lifecycle tracking

mod attributes;
mod config;
mod context;
mod error;
mod lifecycle;
mod names;
pub mod paths;
mod session;

pub use attributes::*;
pub use config::*;
pub use context::*;
pub use error::*;
pub use lifecycle::*;
pub use names::*;
pub use paths::WidgetPaths;
pub use session::*;
