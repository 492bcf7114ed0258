//! dropui - a generic dropdown control for terminal UIs
//!
//! The control picks one or several options of any caller-defined type:
//! - Caller-owned selection, proposed back through a change callback
//! - Viewport-aware placement above or below the trigger
//! - Outside-click dismissal through a shared pointer hub
//! - Optional search filtering, counts and chips
//!
//! Rendering is immediate mode against a [`Renderer`], which either writes
//! ANSI to the terminal or records into a headless grid for tests.

pub mod component;
pub mod components;
pub mod config;
pub mod dismiss;
pub mod event;
pub mod layout;
pub mod render;
pub mod viewport;

// Re-export commonly used types
pub use component::Component;
pub use components::dropdown::{CloseReason, InteractionState, Transition};
pub use components::{
    Dropdown, FieldEdit, NoResultsCause, Placement, Projection, Resolved, RowTarget,
    SearchField, Selection, SelectionMode, VisibleOptions,
};
pub use config::{ConfigError, DropdownConfig, Variant};
pub use dismiss::{ListenerGuard, PointerHub, PointerListener};
pub use event::{Event, EventHandler, Key, MouseButton, MouseEvent};
pub use layout::Rect;
pub use render::Renderer;
#[cfg(feature = "tui")]
pub use viewport::TerminalViewport;
pub use viewport::{FixedViewport, Viewport};
