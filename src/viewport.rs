//! Viewport queries - how much screen is available around a control

use anyhow::Result;

/// Read-only view of the visible screen area, in rows
///
/// Placement asks this once per open transition. Injecting it keeps the
/// placement decision testable without a real terminal.
pub trait Viewport {
    /// Visible height in rows
    fn height(&self) -> Result<u16>;
}

/// Viewport with a fixed, known height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedViewport(pub u16);

impl Viewport for FixedViewport {
    fn height(&self) -> Result<u16> {
        Ok(self.0)
    }
}

/// Viewport backed by the controlling terminal's current size
#[cfg(feature = "tui")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalViewport;

#[cfg(feature = "tui")]
impl Viewport for TerminalViewport {
    fn height(&self) -> Result<u16> {
        use anyhow::Context;

        let (_cols, rows) = crossterm::terminal::size().context("Failed to get terminal size")?;
        Ok(rows)
    }
}

impl<V: Viewport + ?Sized> Viewport for Box<V> {
    fn height(&self) -> Result<u16> {
        (**self).height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_viewport() {
        assert_eq!(FixedViewport(24).height().unwrap(), 24);

        let boxed: Box<dyn Viewport> = Box::new(FixedViewport(40));
        assert_eq!(boxed.height().unwrap(), 40);
    }
}
