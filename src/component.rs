//! Component system - trait and lifecycle for UI elements

use crate::event::EventHandler;
use crate::layout::Rect;
use crate::render::Renderer;
use anyhow::Result;

/// Core component trait for all UI elements
///
/// Components use a hybrid approach:
/// - Retained: component state lives across frames
/// - Immediate: rendering happens fresh each frame via render()
pub trait Component: EventHandler {
    /// Render the component to the given rectangle
    ///
    /// Bounds are in screen coordinates, so components can remember where
    /// they were drawn for pointer hit-testing.
    fn render(&mut self, renderer: &mut Renderer, bounds: Rect) -> Result<()>;

    /// Calculate minimum size needed for this component (optional)
    fn min_size(&self) -> (u16, u16) {
        (0, 0)
    }

    /// Called when component is first mounted
    fn on_mount(&mut self) {}

    /// Called before component is unmounted
    ///
    /// Components holding shared resources (listeners, timers) must release
    /// them here.
    fn on_unmount(&mut self) {}

    /// Mark component as needing redraw
    fn mark_dirty(&mut self) {}

    /// Check if component needs redraw
    fn is_dirty(&self) -> bool {
        true
    }

    /// Get component name for debugging
    fn name(&self) -> &str {
        "Component"
    }
}

/// Helper to propagate events to children, stopping at the first consumer
pub fn propagate_event(
    children: &mut [&mut dyn Component],
    event: &crate::event::Event,
) -> bool {
    children.iter_mut().any(|child| child.handle_event(event))
}
