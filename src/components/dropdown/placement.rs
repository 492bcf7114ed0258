//! Placement engine - open the popover above or below the trigger
//!
//! Decided once per open transition. The popover does not follow scrolling
//! or resizes while it stays open; callers that need that must close and
//! reopen it.

use crate::layout::Rect;
use crate::viewport::Viewport;
use tracing::warn;

/// Side of the trigger the popover opens on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    Above,
    #[default]
    Below,
}

impl Placement {
    /// Chevron pointing away from the trigger
    pub fn chevron(&self) -> char {
        match self {
            Placement::Above => '▴',
            Placement::Below => '▾',
        }
    }
}

/// Pick a side given the free rows on each side
///
/// Opens above only when below is too small and above has strictly more
/// room than the popover needs; below wins every other case, including
/// when neither side fits.
pub fn compute_placement(space_above: u16, space_below: u16, popover_height: u16) -> Placement {
    if space_below < popover_height && space_above > popover_height {
        Placement::Above
    } else {
        Placement::Below
    }
}

/// Placement for a trigger at `trigger` on a screen `viewport_height` rows tall
pub fn placement_for(trigger: Rect, viewport_height: u16, popover_height: u16) -> Placement {
    let space_below = viewport_height.saturating_sub(trigger.bottom());
    let space_above = trigger.y;
    compute_placement(space_above, space_below, popover_height)
}

/// Query the viewport and place
///
/// Also returns the viewport height that was used, so the popover can be
/// clipped to it. A failed query falls back to `Below` with no known height.
pub fn place(
    viewport: &dyn Viewport,
    trigger: Rect,
    popover_height: u16,
) -> (Placement, Option<u16>) {
    match viewport.height() {
        Ok(height) => (placement_for(trigger, height, popover_height), Some(height)),
        Err(err) => {
            warn!(error = %err, "viewport query failed, opening below");
            (Placement::Below, None)
        }
    }
}
