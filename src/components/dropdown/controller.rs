//! Interaction controller - open/closed state, dismissal and filter text
//!
//! ```text
//! Closed --activate (enabled)-----> Open(place(), "")
//! Open   --activate---------------> Closed
//! Open   --outside pointer-down---> Closed
//! Open   --pick (single)----------> Closed
//! Open   --pick (multi)-----------> Open (filter cleared)
//! Open   --done (multi)-----------> Closed
//! Open   --filter edit------------> Open(placement, text)
//! ```
//!
//! The outside-click listener is held only while open: closing by any
//! path drops it, and so does dropping the controller.

use super::placement::Placement;
use super::selection::SelectionMode;
use crate::dismiss::{ListenerGuard, PointerHub, PointerListener};
use crate::layout::Rect;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

/// Private interaction state of one control
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Closed,
    Open { placement: Placement, filter: String },
}

/// Why the popover closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Toggle,
    Picked,
    Done,
    Outside,
    Disabled,
    Blur,
    Unmount,
}

/// Result of feeding an input to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Opened(Placement),
    Closed(CloseReason),
    Unchanged,
}

#[derive(Debug, Default)]
pub struct InteractionController {
    state: InteractionState,
    disabled: bool,
    /// Trigger area (label included) in screen cells
    root: Rect,
    /// Popover area while open
    popover: Rect,
    listener: Option<ListenerGuard>,
}

impl InteractionController {
    pub fn new(disabled: bool) -> Self {
        InteractionController {
            disabled,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, InteractionState::Open { .. })
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Placement of the open popover
    pub fn placement(&self) -> Option<Placement> {
        match &self.state {
            InteractionState::Open { placement, .. } => Some(*placement),
            InteractionState::Closed => None,
        }
    }

    /// Current filter text (empty while closed)
    pub fn filter(&self) -> &str {
        match &self.state {
            InteractionState::Open { filter, .. } => filter,
            InteractionState::Closed => "",
        }
    }

    /// Trigger activation: open when closed, close when open
    pub fn activate(&mut self, place: impl FnOnce() -> Placement) -> Transition {
        if self.is_open() {
            self.close(CloseReason::Toggle)
        } else {
            self.open(place)
        }
    }

    /// Open with a freshly computed placement and an empty filter
    pub fn open(&mut self, place: impl FnOnce() -> Placement) -> Transition {
        if self.disabled || self.is_open() {
            return Transition::Unchanged;
        }
        let placement = place();
        self.state = InteractionState::Open {
            placement,
            filter: String::new(),
        };
        debug!(?placement, "dropdown opened");
        Transition::Opened(placement)
    }

    /// Close, clearing the filter and releasing the outside-click listener
    pub fn close(&mut self, reason: CloseReason) -> Transition {
        if !self.is_open() {
            return Transition::Unchanged;
        }
        self.state = InteractionState::Closed;
        self.popover = Rect::default();
        self.listener = None;
        debug!(?reason, "dropdown closed");
        Transition::Closed(reason)
    }

    /// An option row was picked
    ///
    /// Single-select closes. Multi-select stays open with the filter cleared.
    /// Ignored while closed or disabled.
    pub fn pick(&mut self, mode: SelectionMode) -> Transition {
        if self.disabled || !self.is_open() {
            return Transition::Unchanged;
        }
        match mode {
            SelectionMode::Single => self.close(CloseReason::Picked),
            SelectionMode::Multi => {
                if let InteractionState::Open { filter, .. } = &mut self.state {
                    filter.clear();
                }
                Transition::Unchanged
            }
        }
    }

    /// Explicit "Done" affordance; only multi-select popovers have one
    pub fn done(&mut self, mode: SelectionMode) -> Transition {
        match mode {
            SelectionMode::Multi => self.close(CloseReason::Done),
            SelectionMode::Single => Transition::Unchanged,
        }
    }

    /// Replace the filter text; returns whether it was accepted
    pub fn set_filter(&mut self, text: &str) -> bool {
        if self.disabled {
            return false;
        }
        match &mut self.state {
            InteractionState::Open { filter, .. } => {
                if filter != text {
                    trace!(filter = text, "filter changed");
                    filter.clear();
                    filter.push_str(text);
                }
                true
            }
            InteractionState::Closed => false,
        }
    }

    /// Disabling closes an open popover; the selection is not touched
    pub fn set_disabled(&mut self, disabled: bool) -> Transition {
        self.disabled = disabled;
        if disabled {
            self.close(CloseReason::Disabled)
        } else {
            Transition::Unchanged
        }
    }

    /// Record where the control and its popover were laid out
    pub fn set_bounds(&mut self, root: Rect, popover: Rect) {
        self.root = root;
        self.popover = popover;
    }

    /// Whether a screen cell belongs to this control
    pub fn contains(&self, col: u16, row: u16) -> bool {
        self.root.contains(col, row) || self.popover.contains(col, row)
    }

    /// Pointer-down somewhere on screen; closes if it landed outside
    pub fn dismiss_at(&mut self, col: u16, row: u16) -> Transition {
        if !self.is_open() || self.contains(col, row) {
            return Transition::Unchanged;
        }
        self.close(CloseReason::Outside)
    }

    /// Final close before the control goes away
    pub fn teardown(&mut self) -> Transition {
        let transition = self.close(CloseReason::Unmount);
        self.listener = None;
        transition
    }

    /// Keep `guard` for as long as the popover stays open
    ///
    /// A guard handed over while closed is released immediately.
    pub fn attach_listener(&mut self, guard: ListenerGuard) {
        if self.is_open() {
            self.listener = Some(guard);
        }
    }

    pub fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    /// Subscribe `this` to `hub` for outside-click dismissal
    ///
    /// Replaces any previous subscription, so a control never holds two.
    pub fn listen(this: &Rc<RefCell<Self>>, hub: &PointerHub) {
        let listener = Rc::new(OutsideDismiss {
            controller: Rc::downgrade(this),
        });
        let guard = hub.subscribe(listener);
        this.borrow_mut().attach_listener(guard);
    }
}

/// Hub listener closing its controller on outside pointer-down
struct OutsideDismiss {
    controller: Weak<RefCell<InteractionController>>,
}

impl PointerListener for OutsideDismiss {
    fn on_pointer_down(&self, col: u16, row: u16) {
        let Some(controller) = self.controller.upgrade() else {
            return;
        };
        // Already borrowed means the control itself is handling this event
        let borrowed = controller.try_borrow_mut();
        if let Ok(mut controller) = borrowed {
            controller.dismiss_at(col, row);
        }
    }
}
