//! dropui demo - three dropdowns on one screen
//!
//! Click a trigger (or Tab to it and press Enter) to open it. Clicking
//! anywhere else closes the open popover. Logs go to `dropdown_demo.log`;
//! set RUST_LOG=dropui=debug to see state transitions.
//!
//! DROPUI_DEMO_CONFIG may point at a TOML file configuring the first
//! dropdown, e.g.
//!
//! ```toml
//! label = "Category"
//! searchable = true
//! popover_height = 6
//! ```

use anyhow::{anyhow, Context, Result};
use dropui::{
    component::{propagate_event, Component},
    event::{Event, EventHandler, EventPoller, Key},
    Dropdown, DropdownConfig, PointerHub, Projection, Rect, Renderer, Selection,
    TerminalViewport, Variant,
};
use std::cell::RefCell;
use std::fs::File;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct Category {
    id: u32,
    name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Open,
    InProgress,
    Blocked,
    Closed,
}

impl Status {
    fn label(&self) -> &'static str {
        match self {
            Status::Open => "Open",
            Status::InProgress => "In progress",
            Status::Blocked => "Blocked",
            Status::Closed => "Closed",
        }
    }
}

/// Selection proposed by a dropdown, waiting to be applied
type Pending<K> = Rc<RefCell<Option<Selection<K>>>>;

fn pending<K: 'static>() -> (Pending<K>, impl FnMut(Selection<K>) + 'static) {
    let slot: Pending<K> = Rc::default();
    let sink = slot.clone();
    (slot, move |next| {
        sink.borrow_mut().replace(next);
    })
}

fn apply<T, K: PartialEq + Clone>(dropdown: &mut Dropdown<T, K>, slot: &Pending<K>) {
    if let Some(next) = slot.borrow_mut().take() {
        dropdown.set_value(next);
    }
}

/// Blur the focused control and focus the one `step` places further on
fn move_focus(focus: usize, step: usize, mut children: [&mut dyn Component; 3]) -> usize {
    children[focus].on_blur();
    let next = (focus + step) % children.len();
    children[next].on_focus();
    next
}

fn init_tracing() -> Result<()> {
    let file = File::create("dropdown_demo.log").context("Failed to create log file")?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!(err))
}

fn category_config() -> Result<DropdownConfig> {
    match std::env::var_os("DROPUI_DEMO_CONFIG") {
        Some(path) => Ok(DropdownConfig::from_toml_file(&path)?),
        None => Ok(DropdownConfig::new()
            .with_label("Category")
            .with_searchable(true)),
    }
}

fn main() -> Result<()> {
    init_tracing()?;

    let hub = PointerHub::new();

    let categories: Vec<Category> = [
        "Bug", "Feature", "Chore", "Docs", "Refactor", "Performance", "Security", "Testing",
    ]
    .iter()
    .zip(1..)
    .map(|(name, id)| Category { id, name: *name })
    .collect();
    let (category_value, on_category) = pending();
    let mut category = Dropdown::new(
        categories,
        Selection::Single(Some(1)),
        Projection::new(|c: &Category| c.id, |c: &Category| c.name.to_string()),
        category_config()?,
    )
    .with_pointer_hub(hub.clone())
    .with_viewport(TerminalViewport)
    .on_change(on_category);

    let counts: [u64; 4] = [12, 5, 2, 40];
    let statuses = vec![Status::Open, Status::InProgress, Status::Blocked, Status::Closed];
    let (status_value, on_status) = pending();
    let mut status = Dropdown::new(
        statuses,
        Selection::Single(None),
        Projection::new(|s: &Status| *s, |s: &Status| s.label().to_string())
            .with_count(move |s: &Status| Some(counts[*s as usize])),
        DropdownConfig::new()
            .with_label("Status")
            .with_placeholder("Any")
            .with_variant(Variant::FilterWithIcon)
            .with_show_counts(true),
    )
    .with_pointer_hub(hub.clone())
    .with_viewport(TerminalViewport)
    .on_change(on_status);

    let (tags_value, on_tags) = pending();
    let mut tags = Dropdown::new(
        vec!["urgent", "backend", "frontend", "ux", "infra", "good first issue"],
        Selection::Multi(Vec::new()),
        Projection::new(|t: &&str| t.to_string(), |t: &&str| t.to_string()),
        DropdownConfig::new()
            .with_label("Tags")
            .with_placeholder("No tags")
            .with_multi_select(true)
            .with_searchable(true),
    )
    .with_pointer_hub(hub.clone())
    .with_viewport(TerminalViewport)
    .on_change(on_tags)
    .with_render_option(|tag, selected, _width| {
        Ok(format!("{} {}", if selected { "[x]" } else { "[ ]" }, tag))
    });

    let mut renderer = Renderer::stdout();
    renderer.enter_alt_screen()?;
    let events = EventPoller::new()?;
    let (_cols, mut rows) = crossterm::terminal::size().context("Failed to get terminal size")?;

    let mut focus = 0usize;
    category.on_focus();
    info!("demo started");

    loop {
        let category_bounds = Rect::new(2, 2, 30, 2);
        let status_bounds = Rect::new(2, 5, 40, 1);
        // Near the bottom edge so the popover opens upward
        let tags_bounds = Rect::new(2, rows.saturating_sub(3), 40, 2);

        renderer.begin_frame()?;
        renderer.move_cursor(0, 0)?;
        renderer.write_text("dropui demo - Tab to move focus, q to quit")?;
        category.render(&mut renderer, category_bounds)?;
        status.render(&mut renderer, status_bounds)?;
        tags.render(&mut renderer, tags_bounds)?;
        // Open popovers paint over their neighbours
        if category.is_open() {
            category.render(&mut renderer, category_bounds)?;
        }
        if status.is_open() {
            status.render(&mut renderer, status_bounds)?;
        }
        renderer.end_frame()?;

        let Some(event) = events.poll(Duration::from_millis(16))? else {
            continue;
        };

        hub.dispatch(&event);
        let consumed = {
            let mut children: [&mut dyn Component; 3] = [&mut category, &mut status, &mut tags];
            propagate_event(&mut children, &event)
        };

        if !consumed {
            match event {
                Event::Key(Key::Char('q')) | Event::Key(Key::Ctrl('c')) => break,
                Event::Key(Key::Tab) => {
                    focus = move_focus(focus, 1, [&mut category, &mut status, &mut tags]);
                }
                Event::Key(Key::BackTab) => {
                    focus = move_focus(focus, 2, [&mut category, &mut status, &mut tags]);
                }
                Event::Resize(_cols, new_rows) => rows = new_rows,
                _ => {}
            }
        }

        apply(&mut category, &category_value);
        apply(&mut status, &status_value);
        apply(&mut tags, &tags_value);
    }

    category.on_unmount();
    status.on_unmount();
    tags.on_unmount();
    drop(events);
    renderer.show_cursor()?;
    renderer.exit_alt_screen()?;
    info!("demo finished");

    println!(
        "category: {}, status: {}, tags: {}",
        category.trigger_text(),
        status.trigger_text(),
        tags.trigger_text()
    );
    Ok(())
}
