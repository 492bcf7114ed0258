//! Generic dropdown: pick one or several options from a popover list
//!
//! The control is generic over an opaque option type `T`. It never looks
//! inside an option; it only calls the caller's projections:
//! - key: identity used for selection and equality
//! - label: display text, also matched by the search filter
//! - count: optional badge
//!
//! The selection is owned by the caller. The control only proposes a new
//! selection through `on_change` and renders whatever `set_value` last
//! handed it.
//!
//! # Example
//!
//! ```ignore
//! let projection = Projection::new(|c: &Category| c.id, |c| c.name.clone());
//! let config = DropdownConfig::new().with_label("Categories").with_searchable(true);
//! let mut dropdown = Dropdown::new(categories, Selection::Single(None), projection, config)
//!     .on_change(move |next| pending.borrow_mut().replace(next))
//!     .with_pointer_hub(hub.clone());
//!
//! // In the event loop:
//! hub.dispatch(&event);
//! dropdown.handle_event(&event);
//! if let Some(next) = pending.borrow_mut().take() {
//!     dropdown.set_value(next);
//! }
//! ```

pub mod controller;
pub mod placement;
pub mod selection;

pub use controller::{CloseReason, InteractionController, InteractionState, Transition};
pub use placement::{compute_placement, placement_for, Placement};
pub use selection::{filter_options, resolve_selected, Resolved, Selection, SelectionMode};

use crate::component::Component;
use crate::components::search_field::{FieldEdit, SearchField};
use crate::config::{DropdownConfig, Variant};
use crate::dismiss::PointerHub;
use crate::event::{Event, EventHandler, Key, MouseButton, MouseEvent};
use crate::layout::Rect;
use crate::render::{fit_width, Renderer, STYLE_BOLD, STYLE_DIM, STYLE_REVERSE};
use crate::viewport::Viewport;
use anyhow::Result;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// Key projection
pub type KeyFn<T, K> = Box<dyn Fn(&T) -> K>;
/// Label projection
pub type LabelFn<T> = Box<dyn Fn(&T) -> String>;
/// Count projection
pub type CountFn<T> = Box<dyn Fn(&T) -> Option<u64>>;
/// Selection change callback
pub type OnChange<K> = Box<dyn FnMut(Selection<K>)>;
/// Option row renderer
/// Parameters: option, is_selected, width
///
/// An error falls back to the plain label row.
pub type OptionRenderer<T> = Box<dyn Fn(&T, bool, u16) -> Result<String>>;

/// Minimum popover width of the filter skins
const FILTER_POPOVER_MIN_WIDTH: u16 = 22;

/// Glyph drawn before the label of `Variant::FilterWithIcon`
const FILTER_ICON: char = '≡';

/// Caller-supplied views of an option
pub struct Projection<T, K> {
    key_of: KeyFn<T, K>,
    label_of: LabelFn<T>,
    count_of: Option<CountFn<T>>,
}

impl<T, K> Projection<T, K> {
    pub fn new<KF, LF>(key_of: KF, label_of: LF) -> Self
    where
        KF: Fn(&T) -> K + 'static,
        LF: Fn(&T) -> String + 'static,
    {
        Projection {
            key_of: Box::new(key_of),
            label_of: Box::new(label_of),
            count_of: None,
        }
    }

    /// Add a count badge projection
    pub fn with_count<CF>(mut self, count_of: CF) -> Self
    where
        CF: Fn(&T) -> Option<u64> + 'static,
    {
        self.count_of = Some(Box::new(count_of));
        self
    }

    pub fn key(&self, option: &T) -> K {
        (self.key_of)(option)
    }

    pub fn label(&self, option: &T) -> String {
        (self.label_of)(option)
    }

    /// Badge count; absent when there is no count projection
    pub fn count(&self, option: &T) -> Option<u64> {
        self.count_of.as_ref().and_then(|count_of| count_of(option))
    }
}

/// Why the popover shows the "no results" row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoResultsCause {
    /// The option set is empty
    NoOptions,
    /// The filter text matched nothing
    NoMatches,
}

/// Options the popover lists, as indices into the option set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibleOptions {
    Options(Vec<usize>),
    NoResults(NoResultsCause),
}

/// What a popover row does when clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTarget {
    Search,
    Option(usize),
    NoResults,
    Done,
}

/// Screen geometry from the last arrange pass
#[derive(Debug, Clone, Default)]
struct DropdownLayout {
    label: Rect,
    trigger: Rect,
    popover: Rect,
    /// Popover rows top to bottom: (screen row, target)
    rows: Vec<(u16, RowTarget)>,
    /// Largest useful scroll offset for the current option list
    max_scroll: usize,
}

/// Dropdown component
pub struct Dropdown<T, K> {
    options: Vec<T>,
    value: Selection<K>,
    projection: Projection<T, K>,
    config: DropdownConfig,
    on_change: Option<OnChange<K>>,
    render_option: Option<OptionRenderer<T>>,
    controller: Rc<RefCell<InteractionController>>,
    search: SearchField,
    hub: Option<PointerHub>,
    viewport: Box<dyn Viewport>,
    /// Viewport height captured when the popover last opened
    open_viewport_rows: Option<u16>,
    last_placement: Placement,
    /// Visible options skipped before the first option row
    scroll: usize,
    bounds: Rect,
    layout: DropdownLayout,
    focused: bool,
    dirty: bool,
}

impl<T, K: fmt::Debug> fmt::Debug for Dropdown<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dropdown")
            .field("options", &self.options.len())
            .field("value", &self.value)
            .field("config", &self.config)
            .field("state", self.controller.borrow().state())
            .field("bounds", &self.bounds)
            .finish()
    }
}

#[cfg(feature = "tui")]
fn default_viewport() -> Box<dyn Viewport> {
    Box::new(crate::viewport::TerminalViewport)
}

/// Without a terminal every trigger has unlimited room below
#[cfg(not(feature = "tui"))]
fn default_viewport() -> Box<dyn Viewport> {
    Box::new(crate::viewport::FixedViewport(u16::MAX))
}

impl<T, K: PartialEq + Clone> Dropdown<T, K> {
    pub fn new(
        options: Vec<T>,
        value: Selection<K>,
        projection: Projection<T, K>,
        config: DropdownConfig,
    ) -> Self {
        let search = SearchField::new(config.search_placeholder.clone());
        let controller = InteractionController::new(config.disabled);
        Self {
            options,
            value,
            projection,
            config,
            on_change: None,
            render_option: None,
            controller: Rc::new(RefCell::new(controller)),
            search,
            hub: None,
            viewport: default_viewport(),
            open_viewport_rows: None,
            last_placement: Placement::Below,
            scroll: 0,
            bounds: Rect::default(),
            layout: DropdownLayout::default(),
            focused: false,
            dirty: true,
        }
    }

    /// Set the selection change callback
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Selection<K>) + 'static,
    {
        self.on_change = Some(Box::new(callback));
        self
    }

    /// Replace the default option row rendering
    pub fn with_render_option<F>(mut self, render: F) -> Self
    where
        F: Fn(&T, bool, u16) -> Result<String> + 'static,
    {
        self.render_option = Some(Box::new(render));
        self
    }

    /// Use `hub` for outside-click dismissal while open
    pub fn with_pointer_hub(mut self, hub: PointerHub) -> Self {
        self.hub = Some(hub);
        self
    }

    /// Use `viewport` for placement decisions
    pub fn with_viewport(mut self, viewport: impl Viewport + 'static) -> Self {
        self.viewport = Box::new(viewport);
        self
    }

    pub fn options(&self) -> &[T] {
        &self.options
    }

    /// Replace the option set; selected keys without an option are kept
    pub fn set_options(&mut self, options: Vec<T>) {
        self.options = options;
        self.arrange();
    }

    pub fn value(&self) -> &Selection<K> {
        &self.value
    }

    /// Hand the control the caller's current selection
    pub fn set_value(&mut self, value: Selection<K>) {
        self.value = value;
        self.dirty = true;
    }

    pub fn config(&self) -> &DropdownConfig {
        &self.config
    }

    pub fn is_disabled(&self) -> bool {
        self.config.disabled
    }

    /// Disable or enable; disabling closes the popover but keeps the selection
    pub fn set_disabled(&mut self, disabled: bool) {
        self.config.disabled = disabled;
        let transition = self.controller.borrow_mut().set_disabled(disabled);
        self.after(transition);
    }

    /// Selection model in effect for this control
    pub fn mode(&self) -> SelectionMode {
        if self.config.is_multi() {
            SelectionMode::Multi
        } else {
            SelectionMode::Single
        }
    }

    pub fn is_open(&self) -> bool {
        self.controller.borrow().is_open()
    }

    pub fn placement(&self) -> Option<Placement> {
        self.controller.borrow().placement()
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.controller.borrow().state().clone()
    }

    pub fn filter_text(&self) -> String {
        self.controller.borrow().filter().to_string()
    }

    /// Whether an outside-click listener is currently held
    pub fn is_listening(&self) -> bool {
        self.controller.borrow().has_listener()
    }

    /// Lay the control out at `bounds` without drawing it
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.arrange();
    }

    pub fn trigger_bounds(&self) -> Rect {
        self.layout.trigger
    }

    pub fn popover_bounds(&self) -> Option<Rect> {
        (!self.layout.popover.is_empty()).then_some(self.layout.popover)
    }

    /// Popover rows top to bottom as (screen row, target)
    pub fn popover_rows(&self) -> &[(u16, RowTarget)] {
        &self.layout.rows
    }

    /// Number of visible options scrolled past
    pub fn scroll_offset(&self) -> usize {
        self.scroll
    }

    /// Scroll the option list by `steps` options, positive moving further
    /// into the list; returns whether the offset changed
    pub fn scroll_options(&mut self, steps: isize) -> bool {
        if !self.is_open() {
            return false;
        }
        let next = self
            .scroll
            .saturating_add_signed(steps)
            .min(self.layout.max_scroll);
        if next == self.scroll {
            return false;
        }
        self.scroll = next;
        self.arrange();
        true
    }

    /// Options matching the current selection
    pub fn resolved(&self) -> Resolved<'_, T> {
        let mode = self.mode();
        match (&self.value, mode) {
            // A value of the wrong shape resolves to nothing
            (Selection::Single(_), SelectionMode::Multi) => Resolved::Multi(Vec::new()),
            (Selection::Multi(_), SelectionMode::Single) => Resolved::Single(None),
            (value, _) => resolve_selected(&self.options, value, |o| self.projection.key(o)),
        }
    }

    pub fn is_selected(&self, option: &T) -> bool {
        self.value.mode() == self.mode() && self.value.contains(&self.projection.key(option))
    }

    /// Options the popover would list right now
    pub fn visible_options(&self) -> VisibleOptions {
        if self.options.is_empty() {
            return VisibleOptions::NoResults(NoResultsCause::NoOptions);
        }
        let indices = if self.config.filters() {
            let filter = self.filter_text();
            filter_options(&self.options, |o| self.projection.label(o), &filter)
        } else {
            (0..self.options.len()).collect()
        };
        if indices.is_empty() {
            VisibleOptions::NoResults(NoResultsCause::NoMatches)
        } else {
            VisibleOptions::Options(indices)
        }
    }

    /// Text shown on the trigger: selection, chips, or placeholder
    pub fn trigger_text(&self) -> String {
        match self.resolved() {
            Resolved::Single(Some(option)) => self.projection.label(option),
            Resolved::Multi(options) if !options.is_empty() => {
                let max = self.config.max_chips.max(1);
                let mut chips: Vec<String> = options
                    .iter()
                    .take(max)
                    .map(|option| format!("[{}]", self.projection.label(option)))
                    .collect();
                if options.len() > max {
                    chips.push(format!("[+{}]", options.len() - max));
                }
                chips.join(" ")
            }
            _ => self.config.placeholder.clone(),
        }
    }

    /// Trigger activation: open (placing the popover) or close
    pub fn activate(&mut self) -> Transition {
        let trigger = self.layout.trigger;
        let popover_height = self.config.popover_height.max(1);
        let viewport = &self.viewport;
        let mut viewport_rows = None;

        let transition = self.controller.borrow_mut().activate(|| {
            let (placement, rows) = placement::place(&**viewport, trigger, popover_height);
            viewport_rows = rows;
            placement
        });
        if let Transition::Opened(_) = transition {
            self.open_viewport_rows = viewport_rows;
        }
        self.after(transition);
        transition
    }

    /// Pick the option at `index` in the option set
    ///
    /// Proposes the edited selection through `on_change`, then closes
    /// (single-select) or stays open (multi-select). Returns false when the
    /// pick was not possible (closed, disabled, bad index).
    pub fn pick_option(&mut self, index: usize) -> bool {
        if self.config.disabled || !self.is_open() {
            return false;
        }
        let Some(option) = self.options.get(index) else {
            return false;
        };

        let mode = self.mode();
        let proposed = self.value.toggled(self.projection.key(option), mode);
        debug!(?mode, selected = proposed.len(), "selection change proposed");
        if let Some(on_change) = &mut self.on_change {
            on_change(proposed);
        }

        let had_filter = !self.search.is_empty();
        let transition = self.controller.borrow_mut().pick(mode);
        self.search.clear();
        if had_filter {
            self.scroll = 0;
        }
        self.after(transition);
        true
    }

    /// The multi-select "Done" affordance
    pub fn done(&mut self) -> Transition {
        let transition = self.controller.borrow_mut().done(self.mode());
        self.after(transition);
        transition
    }

    /// Close for `reason` if open
    pub fn close(&mut self, reason: CloseReason) -> Transition {
        let transition = self.controller.borrow_mut().close(reason);
        self.after(transition);
        transition
    }

    /// Replace the filter text; ignored unless the searchable popover is open
    pub fn set_filter_text(&mut self, text: &str) -> bool {
        if !self.config.filters() || !self.controller.borrow_mut().set_filter(text) {
            return false;
        }
        self.search.set_value(text);
        self.scroll = 0;
        self.arrange();
        true
    }

    /// Push the search field's text into the controller
    fn filter_edited(&mut self) {
        let text = self.search.value().to_string();
        self.controller.borrow_mut().set_filter(&text);
        self.scroll = 0;
        self.arrange();
    }

    /// Bookkeeping after a controller transition
    fn after(&mut self, transition: Transition) {
        match transition {
            Transition::Opened(placement) => {
                self.last_placement = placement;
                self.scroll = 0;
                self.search.clear();
                if self.config.filters() {
                    self.search.on_focus();
                }
                if let Some(hub) = &self.hub {
                    InteractionController::listen(&self.controller, hub);
                }
            }
            Transition::Closed(_) => {
                self.search.clear();
                self.search.on_blur();
                self.open_viewport_rows = None;
                self.scroll = 0;
            }
            Transition::Unchanged => {}
        }
        self.arrange();
    }

    /// Catch up with a close that happened through the pointer hub
    fn sync_with_controller(&mut self) {
        if !self.is_open() && !self.layout.popover.is_empty() {
            self.after(Transition::Closed(CloseReason::Outside));
        }
    }

    /// Recompute label, trigger and popover geometry from `self.bounds`
    fn arrange(&mut self) {
        let bounds = self.bounds;
        let (label, trigger) = if self.config.variant.is_filter() {
            let prefix = self.filter_prefix();
            let prefix_width = prefix.chars().count() as u16;
            bounds.row(0).split_vertical(prefix_width)
        } else if self.config.label.is_some() && bounds.height >= 2 {
            (bounds.row(0), bounds.row(1))
        } else {
            (Rect::default(), bounds.row(0))
        };
        let trigger = if bounds.is_empty() {
            Rect::default()
        } else {
            trigger
        };

        let root = label.union(trigger);
        let (popover, rows, max_scroll) = match self.placement() {
            Some(placement) if !trigger.is_empty() => {
                self.arrange_popover(trigger, root.y, placement)
            }
            _ => (Rect::default(), Vec::new(), 0),
        };

        self.controller.borrow_mut().set_bounds(root, popover);
        self.scroll = self.scroll.min(max_scroll);
        self.layout = DropdownLayout {
            label,
            trigger,
            popover,
            rows,
            max_scroll,
        };
        self.dirty = true;
    }

    /// Popover rect, rows and largest scroll offset
    ///
    /// An upward popover stacks above `top` so the label stays visible. At
    /// least one option row is kept next to the search and Done rows even
    /// when that exceeds `popover_height`; only the screen edge clips it.
    fn arrange_popover(
        &self,
        trigger: Rect,
        top: u16,
        placement: Placement,
    ) -> (Rect, Vec<(u16, RowTarget)>, usize) {
        let room = match (placement, self.open_viewport_rows) {
            (Placement::Below, Some(rows)) => rows.saturating_sub(trigger.bottom()),
            (Placement::Below, None) => u16::MAX,
            (Placement::Above, _) => top,
        } as usize;
        let max_rows = (self.config.popover_height.max(1) as usize).min(room);

        let show_search = self.config.filters();
        let show_done = self.mode() == SelectionMode::Multi;
        let fixed = usize::from(show_search) + usize::from(show_done);
        let budget = max_rows.saturating_sub(fixed).max(1);

        // A window of `budget` options starting at the scroll offset
        let (mut option_rows, max_scroll) = match self.visible_options() {
            VisibleOptions::Options(indices) => {
                let max_scroll = indices.len().saturating_sub(budget);
                let rows: Vec<RowTarget> = indices
                    .into_iter()
                    .skip(self.scroll.min(max_scroll))
                    .take(budget)
                    .map(RowTarget::Option)
                    .collect();
                (rows, max_scroll)
            }
            VisibleOptions::NoResults(_) => (vec![RowTarget::NoResults], 0),
        };

        let mut targets = Vec::with_capacity(option_rows.len() + fixed);
        match placement {
            Placement::Below => {
                if show_search {
                    targets.push(RowTarget::Search);
                }
                targets.append(&mut option_rows);
                if show_done {
                    targets.push(RowTarget::Done);
                }
                targets.truncate(room);
            }
            Placement::Above => {
                option_rows.reverse();
                targets.append(&mut option_rows);
                if show_done {
                    targets.push(RowTarget::Done);
                }
                if show_search {
                    targets.push(RowTarget::Search);
                }
                let excess = targets.len().saturating_sub(room);
                targets.drain(..excess);
            }
        }

        let width = if self.config.variant.is_filter() {
            trigger.width.max(FILTER_POPOVER_MIN_WIDTH)
        } else {
            trigger.width
        };
        let height = targets.len() as u16;
        let popover = match placement {
            Placement::Below => trigger.below(width, height),
            Placement::Above => Rect::new(trigger.x, top, trigger.width, 1).above(width, height),
        };
        let rows = targets
            .into_iter()
            .enumerate()
            .take(popover.height as usize)
            .map(|(i, target)| (popover.y + i as u16, target))
            .collect();
        (popover, rows, max_scroll)
    }

    fn filter_prefix(&self) -> String {
        let mut prefix = String::new();
        if self.config.variant == Variant::FilterWithIcon {
            prefix.push(FILTER_ICON);
            prefix.push(' ');
        }
        if let Some(label) = &self.config.label {
            prefix.push_str(label);
            prefix.push(' ');
        }
        prefix
    }

    fn handle_press(&mut self, button: MouseButton, col: u16, row: u16) -> bool {
        let inside = self.controller.borrow().contains(col, row);
        if !inside {
            // Without a hub this control watches pointer-downs itself
            if self.hub.is_none() {
                let transition = self.controller.borrow_mut().dismiss_at(col, row);
                self.after(transition);
            }
            return false;
        }
        if button != MouseButton::Left {
            return true;
        }

        if self.layout.trigger.contains(col, row) {
            self.activate();
            return true;
        }
        if self.layout.popover.contains(col, row) {
            let target = self
                .layout
                .rows
                .iter()
                .find(|(y, _)| *y == row)
                .map(|(_, target)| *target);
            match target {
                Some(RowTarget::Option(index)) => {
                    self.pick_option(index);
                }
                Some(RowTarget::Done) => {
                    self.done();
                }
                Some(RowTarget::Search) => self.search.on_focus(),
                Some(RowTarget::NoResults) | None => {}
            }
        }
        true
    }

    /// Wheel over the popover; `down` is +1 for a downward wheel
    fn handle_wheel(&mut self, col: u16, row: u16, down: isize) -> bool {
        if !self.is_open() || !self.layout.popover.contains(col, row) {
            return false;
        }
        // Upward popovers list options bottom to top
        let steps = match self.placement() {
            Some(Placement::Above) => -down,
            _ => down,
        };
        self.scroll_options(steps);
        true
    }

    fn handle_key(&mut self, key: &Key) -> bool {
        if self.is_open() && self.config.filters() && !self.config.disabled {
            match self.search.handle_key(key) {
                FieldEdit::Changed => {
                    self.filter_edited();
                    return true;
                }
                FieldEdit::Moved => return true,
                FieldEdit::Ignored => {}
            }
        }
        if self.focused && *key == Key::Enter {
            self.activate();
            return true;
        }
        false
    }

    fn option_row_text(&self, option: &T, selected: bool, width: usize) -> String {
        if let Some(render) = &self.render_option {
            match render(option, selected, width as u16) {
                Ok(text) => return fit_width(&text, width),
                Err(err) => warn!(error = %err, "option renderer failed, drawing plain row"),
            }
        }
        let label = self.projection.label(option);
        let count = if self.config.show_counts {
            self.projection.count(option)
        } else {
            None
        };
        match count {
            Some(count) => {
                let badge = count.to_string();
                let badge_width = badge.chars().count() + 1;
                if width <= badge_width {
                    return fit_width(&label, width);
                }
                format!("{} {}", fit_width(&label, width - badge_width), badge)
            }
            None => fit_width(&label, width),
        }
    }

    fn draw_label(&self, renderer: &mut Renderer) -> Result<()> {
        let area = self.layout.label;
        if area.is_empty() {
            return Ok(());
        }
        renderer.move_cursor(area.x, area.y)?;
        let text = if self.config.variant.is_filter() {
            self.filter_prefix()
        } else {
            self.config.label.clone().unwrap_or_default()
        };
        renderer.write_styled(&fit_width(&text, area.width as usize), STYLE_BOLD)
    }

    fn draw_trigger(&self, renderer: &mut Renderer) -> Result<()> {
        let trigger = self.layout.trigger;
        if trigger.is_empty() {
            return Ok(());
        }
        let icon_width = if self.config.show_icon { 2 } else { 0 };
        let text_width = (trigger.width as usize).saturating_sub(icon_width);
        let text = fit_width(&self.trigger_text(), text_width);

        renderer.move_cursor(trigger.x, trigger.y)?;
        if self.config.disabled || self.resolved().is_empty() {
            renderer.write_styled(&text, STYLE_DIM)?;
        } else {
            renderer.write_text(&text)?;
        }
        if self.config.show_icon && trigger.width as usize >= icon_width {
            let chevron = self.placement().unwrap_or(self.last_placement).chevron();
            renderer.write_text(&format!(" {}", chevron))?;
        }
        Ok(())
    }

    fn draw_popover(&mut self, renderer: &mut Renderer) -> Result<()> {
        let popover = self.layout.popover;
        let width = popover.width as usize;
        let rows = self.layout.rows.clone();

        for (y, target) in rows {
            renderer.move_cursor(popover.x, y)?;
            match target {
                RowTarget::Option(index) => {
                    let Some(option) = self.options.get(index) else {
                        continue;
                    };
                    let selected = self.is_selected(option);
                    let text = self.option_row_text(option, selected, width);
                    if selected {
                        renderer.write_styled(&text, STYLE_REVERSE)?;
                    } else {
                        renderer.write_text(&text)?;
                    }
                }
                RowTarget::NoResults => {
                    let text = fit_width(&self.config.no_results_text, width);
                    renderer.write_styled(&text, STYLE_DIM)?;
                }
                RowTarget::Done => {
                    let label = format!("[ {} ]", self.config.done_label);
                    let pad = width.saturating_sub(label.chars().count());
                    renderer.write_repeated(' ', pad)?;
                    renderer.write_text(&fit_width(&label, width - pad))?;
                }
                RowTarget::Search => {
                    let area = Rect::new(popover.x, y, popover.width, 1);
                    self.search.render(renderer, area)?;
                }
            }
        }
        Ok(())
    }
}

impl<T, K: PartialEq + Clone> EventHandler for Dropdown<T, K> {
    fn handle_event(&mut self, event: &Event) -> bool {
        self.sync_with_controller();
        match event {
            Event::Mouse(MouseEvent::Press(button, col, row)) => {
                self.handle_press(*button, *col, *row)
            }
            Event::Mouse(MouseEvent::ScrollDown(col, row)) => self.handle_wheel(*col, *row, 1),
            Event::Mouse(MouseEvent::ScrollUp(col, row)) => self.handle_wheel(*col, *row, -1),
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) if self.is_open() && self.config.filters() => {
                if !self.config.disabled && self.search.paste(text) == FieldEdit::Changed {
                    self.filter_edited();
                }
                true
            }
            Event::FocusLost => {
                self.close(CloseReason::Blur);
                false
            }
            _ => false,
        }
    }

    fn on_focus(&mut self) {
        self.focused = true;
        self.dirty = true;
    }

    fn on_blur(&mut self) {
        self.focused = false;
        self.close(CloseReason::Blur);
    }
}

impl<T, K: PartialEq + Clone> Component for Dropdown<T, K> {
    fn render(&mut self, renderer: &mut Renderer, bounds: Rect) -> Result<()> {
        self.sync_with_controller();
        if bounds != self.bounds {
            self.set_bounds(bounds);
        }
        self.draw_label(renderer)?;
        self.draw_trigger(renderer)?;
        if self.is_open() {
            self.draw_popover(renderer)?;
        }
        self.dirty = false;
        Ok(())
    }

    fn min_size(&self) -> (u16, u16) {
        let text = self.config.placeholder.chars().count() as u16;
        let icon = if self.config.show_icon { 2 } else { 0 };
        if self.config.variant.is_filter() {
            let prefix = self.filter_prefix().chars().count() as u16;
            (prefix + text.max(10) + icon, 1)
        } else {
            let rows = if self.config.label.is_some() { 2 } else { 1 };
            (text.max(10) + icon, rows)
        }
    }

    fn on_unmount(&mut self) {
        let transition = self.controller.borrow_mut().teardown();
        self.after(transition);
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn is_dirty(&self) -> bool {
        self.dirty || self.search.is_dirty()
    }

    fn name(&self) -> &str {
        "Dropdown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::FixedViewport;

    #[derive(Debug, Clone)]
    struct Fruit {
        id: &'static str,
        name: &'static str,
        count: Option<u64>,
    }

    fn fruits() -> Vec<Fruit> {
        vec![
            Fruit { id: "a", name: "Alpha", count: Some(4) },
            Fruit { id: "b", name: "Beta", count: None },
            Fruit { id: "c", name: "Gamma", count: Some(12) },
        ]
    }

    fn projection() -> Projection<Fruit, &'static str> {
        Projection::new(|f: &Fruit| f.id, |f: &Fruit| f.name.to_string()).with_count(|f| f.count)
    }

    type Proposals = Rc<RefCell<Vec<Selection<&'static str>>>>;

    fn dropdown(
        value: Selection<&'static str>,
        config: DropdownConfig,
    ) -> (Dropdown<Fruit, &'static str>, Proposals) {
        let proposals: Proposals = Rc::default();
        let sink = proposals.clone();
        let mut dropdown = Dropdown::new(fruits(), value, projection(), config)
            .with_viewport(FixedViewport(24))
            .on_change(move |next| sink.borrow_mut().push(next));
        dropdown.set_bounds(Rect::new(0, 2, 20, 1));
        (dropdown, proposals)
    }

    #[test]
    fn test_projection_count_absent() {
        let plain: Projection<Fruit, &str> = Projection::new(|f: &Fruit| f.id, |f: &Fruit| f.name.into());
        assert_eq!(plain.count(&fruits()[0]), None);
        assert_eq!(projection().count(&fruits()[0]), Some(4));
        assert_eq!(projection().count(&fruits()[1]), None);
    }

    #[test]
    fn test_trigger_text_placeholder_and_label() {
        let (mut dd, _) = dropdown(Selection::Single(None), DropdownConfig::new());
        assert_eq!(dd.trigger_text(), "Select an option");

        dd.set_value(Selection::Single(Some("c")));
        assert_eq!(dd.trigger_text(), "Gamma");

        // Stale key renders placeholder
        dd.set_value(Selection::Single(Some("zzz")));
        assert_eq!(dd.trigger_text(), "Select an option");
    }

    #[test]
    fn test_trigger_chips_overflow() {
        let config = DropdownConfig::new().with_multi_select(true).with_max_chips(2);
        let (dd, _) = dropdown(Selection::Multi(vec!["c", "a", "b"]), config);
        // Option-set order, not selection order
        assert_eq!(dd.trigger_text(), "[Alpha] [Beta] [+1]");
    }

    #[test]
    fn test_wrong_shape_resolves_empty() {
        let config = DropdownConfig::new().with_multi_select(true);
        let (dd, _) = dropdown(Selection::Single(Some("a")), config);
        assert!(dd.resolved().is_empty());
        assert!(!dd.is_selected(&fruits()[0]));
    }

    #[test]
    fn test_single_pick_proposes_and_closes() {
        let (mut dd, proposals) = dropdown(Selection::Single(Some("a")), DropdownConfig::new());
        dd.activate();
        assert!(dd.is_open());

        assert!(dd.pick_option(1));
        assert!(!dd.is_open());
        assert_eq!(proposals.borrow().as_slice(), &[Selection::Single(Some("b"))]);
        // The caller owns the value; nothing changed until it says so
        assert_eq!(dd.value(), &Selection::Single(Some("a")));
    }

    #[test]
    fn test_multi_pick_stays_open() {
        let config = DropdownConfig::new().with_multi_select(true);
        let (mut dd, proposals) = dropdown(Selection::Multi(vec!["c", "a"]), config);
        dd.activate();

        dd.pick_option(0);
        assert!(dd.is_open());
        assert_eq!(proposals.borrow()[0], Selection::Multi(vec!["c"]));

        dd.set_value(Selection::Multi(vec!["c"]));
        dd.pick_option(1);
        assert_eq!(proposals.borrow()[1], Selection::Multi(vec!["c", "b"]));

        assert_eq!(dd.done(), Transition::Closed(CloseReason::Done));
    }

    #[test]
    fn test_pick_ignored_when_closed_or_disabled() {
        let (mut dd, proposals) = dropdown(Selection::Single(None), DropdownConfig::new());
        assert!(!dd.pick_option(0));

        dd.activate();
        dd.set_disabled(true);
        assert!(!dd.is_open());
        assert!(!dd.pick_option(0));
        assert!(proposals.borrow().is_empty());
    }

    #[test]
    fn test_visible_options_filter_and_sentinel() {
        let config = DropdownConfig::new().with_searchable(true);
        let (mut dd, _) = dropdown(Selection::Single(None), config);
        dd.activate();

        assert!(dd.set_filter_text("al"));
        assert_eq!(dd.visible_options(), VisibleOptions::Options(vec![0]));

        dd.set_filter_text("z");
        assert_eq!(
            dd.visible_options(),
            VisibleOptions::NoResults(NoResultsCause::NoMatches)
        );

        dd.set_options(Vec::new());
        assert_eq!(
            dd.visible_options(),
            VisibleOptions::NoResults(NoResultsCause::NoOptions)
        );
    }

    #[test]
    fn test_filter_only_on_simple_variant() {
        let config = DropdownConfig::new()
            .with_searchable(true)
            .with_variant(Variant::Filter);
        let (mut dd, _) = dropdown(Selection::Single(None), config);
        dd.activate();
        assert!(!dd.set_filter_text("al"));
        assert_eq!(dd.visible_options(), VisibleOptions::Options(vec![0, 1, 2]));
    }

    #[test]
    fn test_filter_cleared_on_close_and_pick() {
        let config = DropdownConfig::new().with_searchable(true);
        let (mut dd, _) = dropdown(Selection::Single(None), config);
        dd.activate();
        dd.set_filter_text("be");
        dd.activate(); // toggle closed
        dd.activate();
        assert_eq!(dd.filter_text(), "");

        dd.set_filter_text("be");
        dd.pick_option(1);
        assert_eq!(dd.filter_text(), "");
    }

    #[test]
    fn test_popover_rows_below() {
        let config = DropdownConfig::new()
            .with_searchable(true)
            .with_multi_select(true);
        let (mut dd, _) = dropdown(Selection::Multi(Vec::new()), config);
        assert_eq!(dd.activate(), Transition::Opened(Placement::Below));

        let targets: Vec<RowTarget> = dd.popover_rows().iter().map(|(_, t)| *t).collect();
        assert_eq!(
            targets,
            vec![
                RowTarget::Search,
                RowTarget::Option(0),
                RowTarget::Option(1),
                RowTarget::Option(2),
                RowTarget::Done,
            ]
        );
        assert_eq!(dd.popover_rows()[0].0, 3);
    }

    #[test]
    fn test_popover_rows_above_are_reversed() {
        let config = DropdownConfig::new().with_searchable(true);
        let (mut dd, _) = dropdown(Selection::Single(None), config);
        dd.set_bounds(Rect::new(0, 22, 20, 1));
        assert_eq!(dd.activate(), Transition::Opened(Placement::Above));

        let rows = dd.popover_rows();
        let targets: Vec<RowTarget> = rows.iter().map(|(_, t)| *t).collect();
        assert_eq!(
            targets,
            vec![
                RowTarget::Option(2),
                RowTarget::Option(1),
                RowTarget::Option(0),
                RowTarget::Search,
            ]
        );
        // Last row sits directly above the trigger
        assert_eq!(rows.last().map(|(y, _)| *y), Some(21));
    }

    #[test]
    fn test_popover_clipped_to_viewport() {
        let config = DropdownConfig::new().with_popover_height(12);
        let (mut dd, _) = dropdown(Selection::Single(None), config);
        dd.set_bounds(Rect::new(0, 21, 20, 1));
        // 2 rows below, 21 above: above wins
        dd.activate();
        assert_eq!(dd.placement(), Some(Placement::Above));

        dd.close(CloseReason::Toggle);
        let mut dd = dd.with_viewport(FixedViewport(24));
        dd.set_bounds(Rect::new(0, 5, 20, 1));
        dd.set_options((0..40).map(|_| fruits()[0].clone()).collect());
        dd.activate();
        assert_eq!(dd.placement(), Some(Placement::Below));
        assert_eq!(dd.popover_rows().len(), 12);
        assert_eq!(dd.popover_rows()[0].1, RowTarget::Option(0));
    }

    #[test]
    fn test_option_row_text_counts() {
        let config = DropdownConfig::new().with_show_counts(true);
        let (dd, _) = dropdown(Selection::Single(None), config);
        let options = fruits();
        assert_eq!(dd.option_row_text(&options[0], false, 10), "Alpha    4");
        // Absent count: no badge
        assert_eq!(dd.option_row_text(&options[1], false, 10), "Beta      ");
    }

    #[test]
    fn test_render_option_override() {
        let (dd, _) = dropdown(Selection::Single(None), DropdownConfig::new());
        let dd = dd.with_render_option(|f, selected, _| {
            Ok(format!("{}{}", if selected { "* " } else { "  " }, f.name))
        });
        assert_eq!(dd.option_row_text(&fruits()[2], true, 9), "* Gamma  ");
    }

    #[test]
    fn test_failing_render_option_draws_plain_row() {
        let config = DropdownConfig::new().with_show_counts(true);
        let (dd, _) = dropdown(Selection::Single(None), config);
        let dd = dd.with_render_option(|f, _, _| {
            if f.id == "a" {
                Err(anyhow::anyhow!("no icon for {}", f.name))
            } else {
                Ok(format!("> {}", f.name))
            }
        });
        let options = fruits();
        assert_eq!(dd.option_row_text(&options[0], false, 10), "Alpha    4");
        assert_eq!(dd.option_row_text(&options[1], false, 10), "> Beta    ");
    }

    fn many_fruits(n: usize) -> Vec<Fruit> {
        (0..n).map(|i| fruits()[i % 3].clone()).collect()
    }

    fn option_targets(dd: &Dropdown<Fruit, &'static str>) -> Vec<RowTarget> {
        dd.popover_rows().iter().map(|(_, t)| *t).collect()
    }

    #[test]
    fn test_wheel_scrolls_to_last_option_below() {
        let config = DropdownConfig::new().with_popover_height(5);
        let (mut dd, proposals) = dropdown(Selection::Single(None), config);
        dd.set_options(many_fruits(20));
        dd.activate();
        assert_eq!(dd.placement(), Some(Placement::Below));
        assert_eq!(dd.popover_rows().len(), 5);

        // Wheel outside the popover is not ours
        assert!(!dd.handle_event(&Event::Mouse(MouseEvent::ScrollDown(30, 3))));
        for _ in 0..30 {
            assert!(dd.handle_event(&Event::Mouse(MouseEvent::ScrollDown(1, 3))));
        }
        assert_eq!(dd.scroll_offset(), 15);
        assert_eq!(
            option_targets(&dd),
            (15..20).map(RowTarget::Option).collect::<Vec<_>>()
        );

        let (row, target) = dd.popover_rows()[4];
        assert_eq!(target, RowTarget::Option(19));
        dd.handle_event(&Event::click(1, row));
        // Option 19 is a clone of Beta
        assert_eq!(proposals.borrow().as_slice(), &[Selection::Single(Some("b"))]);

        dd.activate();
        assert_eq!(dd.scroll_offset(), 0);
        assert_eq!(dd.popover_rows()[0].1, RowTarget::Option(0));
    }

    #[test]
    fn test_wheel_scrolls_upward_popover() {
        let config = DropdownConfig::new().with_popover_height(5);
        let (mut dd, _) = dropdown(Selection::Single(None), config);
        dd.set_options(many_fruits(20));
        dd.set_bounds(Rect::new(0, 22, 20, 1));
        dd.activate();
        assert_eq!(dd.placement(), Some(Placement::Above));

        // Wheeling up moves away from the trigger, deeper into the list
        for _ in 0..20 {
            dd.handle_event(&Event::Mouse(MouseEvent::ScrollUp(1, 20)));
        }
        assert_eq!(dd.scroll_offset(), 15);
        let rows = dd.popover_rows();
        assert_eq!(rows[0], (17, RowTarget::Option(19)));
        assert_eq!(rows[4], (21, RowTarget::Option(15)));

        dd.handle_event(&Event::Mouse(MouseEvent::ScrollDown(1, 20)));
        assert_eq!(dd.scroll_offset(), 14);
    }

    #[test]
    fn test_filter_edit_resets_scroll() {
        let config = DropdownConfig::new()
            .with_searchable(true)
            .with_popover_height(4);
        let (mut dd, _) = dropdown(Selection::Single(None), config);
        dd.set_options(many_fruits(12));
        dd.activate();
        assert!(dd.scroll_options(6));
        assert_eq!(dd.scroll_offset(), 6);

        dd.handle_event(&Event::Key(Key::Char('a')));
        assert_eq!(dd.scroll_offset(), 0);
        assert_eq!(dd.popover_rows()[1].1, RowTarget::Option(0));
        // Closed controls do not scroll
        dd.close(CloseReason::Toggle);
        assert!(!dd.scroll_options(1));
    }

    #[test]
    fn test_cramped_popover_keeps_an_option_row() {
        let config = DropdownConfig::new()
            .with_multi_select(true)
            .with_searchable(true)
            .with_popover_height(2);
        let (mut dd, _) = dropdown(Selection::Multi(Vec::new()), config);
        dd.activate();
        assert_eq!(
            option_targets(&dd),
            vec![RowTarget::Search, RowTarget::Option(0), RowTarget::Done]
        );

        dd.scroll_options(5);
        assert_eq!(dd.scroll_offset(), 2);
        assert_eq!(option_targets(&dd)[1], RowTarget::Option(2));
    }

    #[test]
    fn test_paste_inserts_at_cursor() {
        let config = DropdownConfig::new().with_searchable(true);
        let (mut dd, _) = dropdown(Selection::Single(None), config);
        dd.activate();
        for c in "mma".chars() {
            dd.handle_event(&Event::Key(Key::Char(c)));
        }
        dd.handle_event(&Event::Key(Key::Home));
        assert!(dd.handle_event(&Event::Paste("Ga".to_string())));

        assert_eq!(dd.filter_text(), "Gamma");
        assert_eq!(dd.search.cursor_position(), 2);
        assert_eq!(dd.visible_options(), VisibleOptions::Options(vec![2]));
    }

    #[test]
    fn test_state_accessors_track_controller() {
        let (mut dd, _) = dropdown(Selection::Single(None), DropdownConfig::new());
        assert_eq!(dd.trigger_bounds(), Rect::new(0, 2, 20, 1));
        assert_eq!(dd.interaction_state(), InteractionState::Closed);

        dd.activate();
        assert_eq!(
            dd.interaction_state(),
            InteractionState::Open {
                placement: Placement::Below,
                filter: String::new(),
            }
        );

        dd.set_disabled(true);
        assert!(dd.is_disabled());
        assert_eq!(dd.interaction_state(), InteractionState::Closed);
    }

    #[test]
    fn test_blur_closes() {
        let (mut dd, _) = dropdown(Selection::Single(None), DropdownConfig::new());
        dd.on_focus();
        dd.handle_event(&Event::Key(Key::Enter));
        assert!(dd.is_open());

        dd.on_blur();
        assert!(!dd.is_open());
    }

    #[test]
    fn test_typing_filters_when_open() {
        let config = DropdownConfig::new().with_searchable(true);
        let (mut dd, _) = dropdown(Selection::Single(None), config);
        dd.activate();
        dd.handle_event(&Event::Key(Key::Char('G')));
        assert_eq!(dd.filter_text(), "G");
        assert_eq!(dd.visible_options(), VisibleOptions::Options(vec![2]));

        dd.handle_event(&Event::Key(Key::Backspace));
        assert_eq!(dd.filter_text(), "");
    }

    #[test]
    fn test_unmount_releases_listener() {
        let hub = PointerHub::new();
        let (dd, _) = dropdown(Selection::Single(None), DropdownConfig::new());
        let mut dd = dd.with_pointer_hub(hub.clone());
        dd.activate();
        assert_eq!(hub.listener_count(), 1);

        dd.on_unmount();
        assert!(!dd.is_open());
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn test_render_draws_label_trigger_and_rows() {
        let config = DropdownConfig::new().with_label("Fruit").with_show_counts(true);
        let (mut dd, _) = dropdown(Selection::Single(Some("b")), config);
        let mut renderer = Renderer::headless(30, 10);
        dd.render(&mut renderer, Rect::new(0, 0, 20, 2)).unwrap();
        dd.activate();
        dd.render(&mut renderer, Rect::new(0, 0, 20, 2)).unwrap();

        let grid = renderer.grid().unwrap();
        assert_eq!(grid.line(0), "Fruit");
        assert_eq!(grid.line(1), "Beta               ▾");
        assert_eq!(grid.line(2), "Alpha              4");
        assert_eq!(grid.line(3), "Beta");
        assert!(grid.is_highlighted(0, 3));
        assert!(!grid.is_highlighted(0, 2));
        assert_eq!(grid.line(4), "Gamma             12");
    }
}
