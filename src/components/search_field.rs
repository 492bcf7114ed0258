//! Single-line search field used to filter dropdown options
//!
//! A trimmed-down text editor:
//! - Cursor movement (left, right, home, end)
//! - Insert, backspace, delete, Ctrl-U/Ctrl-W
//! - Single-line paste
//! - Dim placeholder while empty

use crate::component::Component;
use crate::event::{Event, EventHandler, Key};
use crate::layout::Rect;
use crate::render::{Renderer, STYLE_DIM, STYLE_REVERSE};
use anyhow::Result;

/// Outcome of feeding a key or paste to the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEdit {
    /// Text changed
    Changed,
    /// Only the cursor moved
    Moved,
    /// Input not handled
    Ignored,
}

impl FieldEdit {
    pub fn handled(&self) -> bool {
        !matches!(self, FieldEdit::Ignored)
    }
}

/// Search field component
#[derive(Debug, Clone)]
pub struct SearchField {
    /// Input buffer
    buffer: String,
    /// Cursor position (byte offset)
    cursor: usize,
    /// Text shown while the buffer is empty
    placeholder: String,
    focused: bool,
    dirty: bool,
}

impl SearchField {
    pub fn new(placeholder: impl Into<String>) -> Self {
        SearchField {
            buffer: String::new(),
            cursor: 0,
            placeholder: placeholder.into(),
            focused: false,
            dirty: true,
        }
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    /// Replace the text, moving the cursor to the end
    pub fn set_value(&mut self, value: &str) {
        if self.buffer != value {
            self.buffer = value.to_string();
            self.dirty = true;
        }
        self.cursor = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.set_value("");
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    fn prev_boundary(&self) -> usize {
        self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.buffer[self.cursor..]
            .char_indices()
            .nth(1)
            .map(|(i, _)| self.cursor + i)
            .unwrap_or(self.buffer.len())
    }

    /// Apply one key
    pub fn handle_key(&mut self, key: &Key) -> FieldEdit {
        let edit = match key {
            Key::Char(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                FieldEdit::Changed
            }
            Key::Backspace if self.cursor > 0 => {
                let prev = self.prev_boundary();
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                FieldEdit::Changed
            }
            Key::Delete if self.cursor < self.buffer.len() => {
                let next = self.next_boundary();
                self.buffer.drain(self.cursor..next);
                FieldEdit::Changed
            }
            Key::Ctrl('u') if self.cursor > 0 => {
                self.buffer.drain(..self.cursor);
                self.cursor = 0;
                FieldEdit::Changed
            }
            Key::Ctrl('w') if self.cursor > 0 => {
                let head = &self.buffer[..self.cursor];
                let word_start = head
                    .trim_end()
                    .rfind(char::is_whitespace)
                    .map(|i| i + 1)
                    .unwrap_or(0);
                self.buffer.drain(word_start..self.cursor);
                self.cursor = word_start;
                FieldEdit::Changed
            }
            Key::Left => {
                self.cursor = self.prev_boundary();
                FieldEdit::Moved
            }
            Key::Right => {
                self.cursor = self.next_boundary();
                FieldEdit::Moved
            }
            Key::Home | Key::Ctrl('a') => {
                self.cursor = 0;
                FieldEdit::Moved
            }
            Key::End | Key::Ctrl('e') => {
                self.cursor = self.buffer.len();
                FieldEdit::Moved
            }
            // Editing keys at a boundary are still ours, just no-ops
            Key::Backspace | Key::Delete | Key::Ctrl('u') | Key::Ctrl('w') => FieldEdit::Moved,
            _ => FieldEdit::Ignored,
        };
        if edit.handled() {
            self.dirty = true;
        }
        edit
    }

    /// Insert pasted text with line breaks stripped
    pub fn paste(&mut self, text: &str) -> FieldEdit {
        let clean: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();
        if clean.is_empty() {
            return FieldEdit::Ignored;
        }
        self.buffer.insert_str(self.cursor, &clean);
        self.cursor += clean.len();
        self.dirty = true;
        FieldEdit::Changed
    }
}

impl EventHandler for SearchField {
    fn handle_event(&mut self, event: &Event) -> bool {
        if !self.focused {
            return false;
        }
        match event {
            Event::Key(key) => self.handle_key(key).handled(),
            Event::Paste(text) => self.paste(text).handled(),
            _ => false,
        }
    }

    fn on_focus(&mut self) {
        self.focused = true;
        self.dirty = true;
    }

    fn on_blur(&mut self) {
        self.focused = false;
        self.dirty = true;
    }
}

impl Component for SearchField {
    fn render(&mut self, renderer: &mut Renderer, bounds: Rect) -> Result<()> {
        let width = bounds.width as usize;
        renderer.move_cursor(bounds.x, bounds.y)?;
        if width == 0 {
            self.dirty = false;
            return Ok(());
        }

        if self.buffer.is_empty() {
            let hint: String = self.placeholder.chars().take(width).collect();
            renderer.write_styled(&hint, STYLE_DIM)?;
            if self.focused && hint.is_empty() {
                renderer.write_styled(" ", STYLE_REVERSE)?;
            }
            self.dirty = false;
            return Ok(());
        }

        // Scroll so the cursor stays visible
        let cursor_col = self.buffer[..self.cursor].chars().count();
        let scroll = (cursor_col + 1).saturating_sub(width);
        let visible: Vec<char> = self.buffer.chars().skip(scroll).take(width).collect();
        let cursor_in_view = cursor_col - scroll;

        let before: String = visible.iter().take(cursor_in_view).collect();
        renderer.write_text(&before)?;
        if self.focused {
            let at = visible
                .get(cursor_in_view)
                .map(|c| c.to_string())
                .unwrap_or_else(|| " ".to_string());
            renderer.write_styled(&at, STYLE_REVERSE)?;
            let after: String = visible.iter().skip(cursor_in_view + 1).collect();
            renderer.write_text(&after)?;
        } else {
            let after: String = visible.iter().skip(cursor_in_view).collect();
            renderer.write_text(&after)?;
        }

        self.dirty = false;
        Ok(())
    }

    fn min_size(&self) -> (u16, u16) {
        (10, 1)
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn name(&self) -> &str {
        "SearchField"
    }
}
