//! Session state partitioning for widgets.
//!
//! Each widget instance owns two slots in the visitor's session, keyed by
//! widget type, identifier and scope:
//!
//! ```text
//! widget_sidebar_default_page
//! widget_sidebar_default_permanent
//! ```
//!
//! # Example
//!
//! ```rust
//! use widget_core::{WidgetIdentifier, WidgetTypeName};
//! use widget_session::{MemorySession, StatePartition, StateScope};
//!
//! let session = MemorySession::new();
//! let sidebar = WidgetTypeName::new("sidebar").unwrap();
//! let state = StatePartition::new(&sidebar, WidgetIdentifier::default(), Some(&session));
//!
//! state.create_state(StateScope::Page).unwrap();
//! state.slot(StateScope::Page).insert("open", true).unwrap();
//! assert_eq!(state.read_state(StateScope::Page).unwrap().len(), 1);
//! ```

mod key;
mod memory;
mod partition;

pub use key::{session_key, SessionStateKey, StateScope, KEY_NAMESPACE};
pub use memory::MemorySession;
pub use partition::{StateMap, StatePartition, StateSlot};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{MemorySession, StatePartition, StateScope, StateSlot};
}
