//! Event system - keyboard, pointer, and focus events

/// Keyboard key representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Ctrl(char),
    Alt(char),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Backspace,
    Delete,
    Enter,
    Tab,
    BackTab,
    Esc,
    Null,
}

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Mouse event types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEvent {
    Press(MouseButton, u16, u16), // button, col, row
    Release(u16, u16),            // col, row
    Hold(u16, u16),               // col, row (drag)
    ScrollUp(u16, u16),           // col, row
    ScrollDown(u16, u16),         // col, row
}

/// UI events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Keyboard event
    Key(Key),
    /// Mouse event
    Mouse(MouseEvent),
    /// Terminal resized (new cols, new rows)
    Resize(u16, u16),
    /// Focus gained
    FocusGained,
    /// Focus lost
    FocusLost,
    /// Paste event
    Paste(String),
}

impl Event {
    /// Left-button press at (col, row)
    pub fn click(col: u16, row: u16) -> Self {
        Event::Mouse(MouseEvent::Press(MouseButton::Left, col, row))
    }

    /// Position of a pointer-down (any button press), if this is one
    pub fn pointer_down(&self) -> Option<(u16, u16)> {
        match self {
            Event::Mouse(MouseEvent::Press(_, col, row)) => Some((*col, *row)),
            _ => None,
        }
    }
}

/// Event handler trait for components
pub trait EventHandler {
    /// Handle an event, return true if consumed (stops propagation)
    fn handle_event(&mut self, _event: &Event) -> bool {
        false
    }

    /// Called when component gains focus
    fn on_focus(&mut self) {}

    /// Called when component loses focus
    fn on_blur(&mut self) {}
}

#[cfg(feature = "tui")]
pub use poller::EventPoller;

#[cfg(feature = "tui")]
mod poller {
    use super::{Event, Key, MouseButton, MouseEvent};
    use anyhow::Result;
    use std::time::Duration;

    /// Event polling and conversion from crossterm events
    ///
    /// Enables raw mode, mouse capture and focus reporting for its lifetime.
    pub struct EventPoller {
        _enabled: bool,
    }

    impl EventPoller {
        /// Create a new event poller
        pub fn new() -> Result<Self> {
            crossterm::terminal::enable_raw_mode()?;

            // Mouse capture is required for pointer dismissal; focus reporting is optional
            crossterm::execute!(std::io::stdout(), crossterm::event::EnableMouseCapture)?;
            let _ = crossterm::execute!(std::io::stdout(), crossterm::event::EnableFocusChange);

            Ok(EventPoller { _enabled: true })
        }

        /// Poll for next event with timeout
        pub fn poll(&self, timeout: Duration) -> Result<Option<Event>> {
            if crossterm::event::poll(timeout)? {
                Ok(convert_crossterm_event(crossterm::event::read()?))
            } else {
                Ok(None)
            }
        }

        /// Block and wait for the next event this library understands
        pub fn read(&self) -> Result<Event> {
            loop {
                if let Some(event) = convert_crossterm_event(crossterm::event::read()?) {
                    return Ok(event);
                }
            }
        }
    }

    impl Drop for EventPoller {
        fn drop(&mut self) {
            let _ = crossterm::execute!(
                std::io::stdout(),
                crossterm::event::DisableMouseCapture,
                crossterm::event::DisableFocusChange,
            );
            let _ = crossterm::terminal::disable_raw_mode();
        }
    }

    /// Convert crossterm event to our Event type
    ///
    /// Key releases and mouse movement without a button are dropped.
    pub(crate) fn convert_crossterm_event(event: crossterm::event::Event) -> Option<Event> {
        use crossterm::event::{Event as CEvent, KeyEventKind, MouseEventKind};

        match event {
            CEvent::Key(key) if key.kind == KeyEventKind::Release => None,
            CEvent::Key(key) => Some(Event::Key(convert_key(key.code, key.modifiers))),
            CEvent::Mouse(me) => {
                let (col, row) = (me.column, me.row);
                let mouse_event = match me.kind {
                    MouseEventKind::Down(btn) => MouseEvent::Press(convert_button(btn), col, row),
                    MouseEventKind::Up(_) => MouseEvent::Release(col, row),
                    MouseEventKind::Drag(_) => MouseEvent::Hold(col, row),
                    MouseEventKind::ScrollUp => MouseEvent::ScrollUp(col, row),
                    MouseEventKind::ScrollDown => MouseEvent::ScrollDown(col, row),
                    _ => return None,
                };
                Some(Event::Mouse(mouse_event))
            }
            CEvent::Resize(cols, rows) => Some(Event::Resize(cols, rows)),
            CEvent::FocusGained => Some(Event::FocusGained),
            CEvent::FocusLost => Some(Event::FocusLost),
            CEvent::Paste(data) => Some(Event::Paste(data)),
        }
    }

    fn convert_button(button: crossterm::event::MouseButton) -> MouseButton {
        match button {
            crossterm::event::MouseButton::Left => MouseButton::Left,
            crossterm::event::MouseButton::Right => MouseButton::Right,
            crossterm::event::MouseButton::Middle => MouseButton::Middle,
        }
    }

    /// Convert crossterm key code to our Key type
    fn convert_key(code: crossterm::event::KeyCode, mods: crossterm::event::KeyModifiers) -> Key {
        use crossterm::event::{KeyCode, KeyModifiers};

        if let KeyCode::Char(c) = code {
            if mods.contains(KeyModifiers::CONTROL) {
                return Key::Ctrl(c);
            }
            if mods.contains(KeyModifiers::ALT) {
                return Key::Alt(c);
            }
        }

        match code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Enter => Key::Enter,
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => Key::BackTab,
            KeyCode::Esc => Key::Esc,
            _ => Key::Null,
        }
    }

}
