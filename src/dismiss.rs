//! Screen-wide pointer listeners for outside-click dismissal
//!
//! Events normally propagate through the component tree and stop at the
//! first consumer, so a popover cannot rely on seeing a click that landed
//! on some other component. The `PointerHub` is the screen-level capture
//! point: the application dispatches every event to it before normal
//! propagation, and open popovers subscribe to it.
//!
//! Subscriptions are scoped: `subscribe` returns a `ListenerGuard` that
//! unregisters on drop, so a listener exists exactly as long as its owner
//! keeps the guard.
//!
//! # Example
//!
//! ```ignore
//! let hub = PointerHub::new();
//! let mut dropdown = Dropdown::new(options, value, projection, config)
//!     .with_pointer_hub(hub.clone());
//!
//! // In the event loop:
//! hub.dispatch(&event);
//! dropdown.handle_event(&event);
//! ```

use crate::event::Event;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::trace;

/// Identifier handed out per subscription
pub type ListenerId = u64;

/// Receives every pointer-down seen by the hub
pub trait PointerListener {
    fn on_pointer_down(&self, col: u16, row: u16);
}

#[derive(Default)]
struct HubInner {
    next_id: ListenerId,
    listeners: Vec<(ListenerId, Rc<dyn PointerListener>)>,
}

/// Registry of screen-wide pointer-down listeners
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone, Default)]
pub struct PointerHub {
    inner: Rc<RefCell<HubInner>>,
}

impl fmt::Debug for PointerHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl PointerHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it stays registered until the guard is dropped
    pub fn subscribe(&self, listener: Rc<dyn PointerListener>) -> ListenerGuard {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, listener));
        trace!(listener = id, active = inner.listeners.len(), "pointer listener attached");

        ListenerGuard {
            id,
            hub: Rc::downgrade(&self.inner),
        }
    }

    /// Number of currently registered listeners
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Forward a pointer-down to every listener
    ///
    /// Non pointer-down events are ignored. Returns how many listeners were
    /// notified. Listeners may drop their own guard while being notified.
    pub fn dispatch(&self, event: &Event) -> usize {
        let Some((col, row)) = event.pointer_down() else {
            return 0;
        };

        // Snapshot so listeners can unsubscribe without a re-entrant borrow
        let snapshot: Vec<Rc<dyn PointerListener>> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        trace!(col, row, listeners = snapshot.len(), "dispatching pointer-down");
        for listener in &snapshot {
            listener.on_pointer_down(col, row);
        }
        snapshot.len()
    }
}

/// Scoped subscription; unregisters its listener when dropped
#[derive(Debug)]
pub struct ListenerGuard {
    id: ListenerId,
    hub: Weak<RefCell<HubInner>>,
}

impl ListenerGuard {
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            let mut inner = inner.borrow_mut();
            inner.listeners.retain(|(id, _)| *id != self.id);
            trace!(listener = self.id, active = inner.listeners.len(), "pointer listener released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Key;
    use std::cell::Cell;

    #[derive(Default)]
    struct Counter {
        hits: Cell<usize>,
        last: Cell<(u16, u16)>,
    }

    impl PointerListener for Counter {
        fn on_pointer_down(&self, col: u16, row: u16) {
            self.hits.set(self.hits.get() + 1);
            self.last.set((col, row));
        }
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let hub = PointerHub::new();
        let counter = Rc::new(Counter::default());

        let guard = hub.subscribe(counter.clone());
        assert_eq!(hub.listener_count(), 1);

        drop(guard);
        assert_eq!(hub.listener_count(), 0);
        assert_eq!(hub.dispatch(&Event::click(1, 1)), 0);
        assert_eq!(counter.hits.get(), 0);
    }

    #[test]
    fn test_dispatch_only_pointer_down() {
        let hub = PointerHub::new();
        let counter = Rc::new(Counter::default());
        let _guard = hub.subscribe(counter.clone());

        assert_eq!(hub.dispatch(&Event::Key(Key::Enter)), 0);
        assert_eq!(hub.dispatch(&Event::click(3, 8)), 1);
        assert_eq!(counter.hits.get(), 1);
        assert_eq!(counter.last.get(), (3, 8));
    }

    struct SelfRemoving {
        guard: RefCell<Option<ListenerGuard>>,
    }

    impl PointerListener for SelfRemoving {
        fn on_pointer_down(&self, _col: u16, _row: u16) {
            self.guard.borrow_mut().take();
        }
    }

    #[test]
    fn test_listener_can_unsubscribe_during_dispatch() {
        let hub = PointerHub::new();
        let listener = Rc::new(SelfRemoving {
            guard: RefCell::new(None),
        });
        let guard = hub.subscribe(listener.clone());
        *listener.guard.borrow_mut() = Some(guard);

        assert_eq!(hub.dispatch(&Event::click(0, 0)), 1);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn test_guard_outliving_hub() {
        let guard = {
            let hub = PointerHub::new();
            hub.subscribe(Rc::new(Counter::default()))
        };
        // Hub is gone; dropping the guard must not panic
        drop(guard);
    }
}
