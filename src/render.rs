//! Rendering backend - buffered terminal output or a headless cell grid
//!
//! Components issue the same immediate-mode calls (`move_cursor`,
//! `write_text`, `write_styled`) against either backend:
//! - `Renderer::stdout()` batches ANSI output into a `BufWriter`
//! - `Renderer::headless()` records characters into an in-memory grid, so
//!   rendering can be asserted without a real terminal

use anyhow::Result;
use std::io::{self, BufWriter, Write};

/// Default buffer capacity for write batching (16KB)
const WRITE_BUFFER_CAPACITY: usize = 16 * 1024;

/// Reverse video, used for selected rows and the text cursor
pub const STYLE_REVERSE: &str = "\x1b[7m";
/// Dim, used for placeholders and disabled controls
pub const STYLE_DIM: &str = "\x1b[2m";
/// Bold, used for labels
pub const STYLE_BOLD: &str = "\x1b[1m";

/// In-memory character grid used by the headless backend
#[derive(Debug, Clone)]
pub struct CellGrid {
    cols: u16,
    rows: u16,
    cells: Vec<char>,
    /// Cells written with reverse video
    highlighted: Vec<bool>,
}

impl CellGrid {
    fn new(cols: u16, rows: u16) -> Self {
        let len = cols as usize * rows as usize;
        CellGrid {
            cols,
            rows,
            cells: vec![' '; len],
            highlighted: vec![false; len],
        }
    }

    fn put(&mut self, col: u16, row: u16, ch: char, highlighted: bool) {
        if col >= self.cols || row >= self.rows {
            return;
        }
        let idx = row as usize * self.cols as usize + col as usize;
        self.cells[idx] = ch;
        self.highlighted[idx] = highlighted;
    }

    /// Text of one row with trailing blanks trimmed
    pub fn line(&self, row: u16) -> String {
        if row >= self.rows {
            return String::new();
        }
        let start = row as usize * self.cols as usize;
        let line: String = self.cells[start..start + self.cols as usize]
            .iter()
            .collect();
        line.trim_end().to_string()
    }

    /// All rows joined with newlines
    pub fn text(&self) -> String {
        (0..self.rows)
            .map(|row| self.line(row))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether the cell was written in reverse video
    pub fn is_highlighted(&self, col: u16, row: u16) -> bool {
        if col >= self.cols || row >= self.rows {
            return false;
        }
        self.highlighted[row as usize * self.cols as usize + col as usize]
    }

    /// Row index of the first line containing `needle`
    pub fn find_row(&self, needle: &str) -> Option<u16> {
        (0..self.rows).find(|&row| self.line(row).contains(needle))
    }
}

enum Backend {
    Terminal(BufWriter<io::Stdout>),
    Headless {
        grid: CellGrid,
        col: u16,
        row: u16,
    },
}

/// Immediate-mode renderer
///
/// Call `flush()` after a batch of operations on the terminal backend to
/// ensure output is displayed.
pub struct Renderer {
    backend: Backend,
}

impl Renderer {
    /// Create a renderer that writes ANSI sequences to stdout
    pub fn stdout() -> Self {
        Renderer {
            backend: Backend::Terminal(BufWriter::with_capacity(
                WRITE_BUFFER_CAPACITY,
                io::stdout(),
            )),
        }
    }

    /// Create a renderer that draws into an in-memory grid
    pub fn headless(cols: u16, rows: u16) -> Self {
        Renderer {
            backend: Backend::Headless {
                grid: CellGrid::new(cols, rows),
                col: 0,
                row: 0,
            },
        }
    }

    /// The recorded grid, if this is a headless renderer
    pub fn grid(&self) -> Option<&CellGrid> {
        match &self.backend {
            Backend::Headless { grid, .. } => Some(grid),
            Backend::Terminal(_) => None,
        }
    }

    /// Clear the screen
    pub fn clear(&mut self) -> Result<()> {
        match &mut self.backend {
            Backend::Terminal(writer) => write!(writer, "\x1b[2J")?,
            Backend::Headless { grid, .. } => *grid = CellGrid::new(grid.cols, grid.rows),
        }
        Ok(())
    }

    /// Move cursor to position (0-indexed)
    #[inline]
    pub fn move_cursor(&mut self, col: u16, row: u16) -> Result<()> {
        match &mut self.backend {
            Backend::Terminal(writer) => write!(writer, "\x1b[{};{}H", row + 1, col + 1)?,
            Backend::Headless {
                col: cur_col,
                row: cur_row,
                ..
            } => {
                *cur_col = col;
                *cur_row = row;
            }
        }
        Ok(())
    }

    /// Hide cursor
    pub fn hide_cursor(&mut self) -> Result<()> {
        if let Backend::Terminal(writer) = &mut self.backend {
            write!(writer, "\x1b[?25l")?;
        }
        Ok(())
    }

    /// Show cursor
    pub fn show_cursor(&mut self) -> Result<()> {
        if let Backend::Terminal(writer) = &mut self.backend {
            write!(writer, "\x1b[?25h")?;
        }
        Ok(())
    }

    /// Write text at current cursor position
    #[inline]
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        self.write_cells(text, false)
    }

    /// Write text with ANSI color/style codes
    ///
    /// The headless grid only remembers reverse video.
    #[inline]
    pub fn write_styled(&mut self, text: &str, style: &str) -> Result<()> {
        if let Backend::Terminal(writer) = &mut self.backend {
            write!(writer, "{}{}\x1b[0m", style, text)?;
            return Ok(());
        }
        self.write_cells(text, style.contains(STYLE_REVERSE))
    }

    /// Write a repeated character
    #[inline]
    pub fn write_repeated(&mut self, ch: char, count: usize) -> Result<()> {
        let text: String = std::iter::repeat(ch).take(count).collect();
        self.write_text(&text)
    }

    fn write_cells(&mut self, text: &str, highlighted: bool) -> Result<()> {
        match &mut self.backend {
            Backend::Terminal(writer) => write!(writer, "{}", text)?,
            Backend::Headless { grid, col, row } => {
                for ch in text.chars() {
                    grid.put(*col, *row, ch, highlighted);
                    *col = col.saturating_add(1);
                }
            }
        }
        Ok(())
    }

    /// Flush output buffer to terminal
    pub fn flush(&mut self) -> Result<()> {
        if let Backend::Terminal(writer) = &mut self.backend {
            writer.flush()?;
        }
        Ok(())
    }

    /// Enter alternative screen buffer
    pub fn enter_alt_screen(&mut self) -> Result<()> {
        if let Backend::Terminal(writer) = &mut self.backend {
            write!(writer, "\x1b[?1049h")?;
            writer.flush()?;
        }
        Ok(())
    }

    /// Exit alternative screen buffer
    pub fn exit_alt_screen(&mut self) -> Result<()> {
        if let Backend::Terminal(writer) = &mut self.backend {
            write!(writer, "\x1b[?1049l")?;
            writer.flush()?;
        }
        Ok(())
    }

    /// Begin a render frame - hides cursor and clears the previous frame
    pub fn begin_frame(&mut self) -> Result<()> {
        self.hide_cursor()?;
        self.clear()
    }

    /// End a render frame - flushes output
    pub fn end_frame(&mut self) -> Result<()> {
        self.flush()
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Backend::Terminal(writer) = &mut self.backend {
            let _ = write!(writer, "\x1b[?25h");
            let _ = writer.flush();
        }
    }
}

/// Fit `text` into exactly `width` cells, truncating with "..." when needed
pub fn fit_width(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len <= width {
        let mut out = text.to_string();
        out.extend(std::iter::repeat(' ').take(width - len));
        out
    } else if width <= 3 {
        text.chars().take(width).collect()
    } else {
        let mut out: String = text.chars().take(width - 3).collect();
        out.push_str("...");
        out
    }
}
