//! View: the bridge from document to terminal bytes.
//!
//! A `View` holds the scroll offsets, the terminal size and the gutter
//! setting, and turns a [`Document`] plus a [`Cursor`] into one complete
//! frame of ANSI output:
//!
//! ```text
//! ┌───┬───────────────────────────┐
//! │ 1 │ int main(void) {          │ ← text rows (terminal rows − 2)
//! │ 2 │     return 0;             │
//! │ 3 │ }                         │
//! │ ~                             │
//! ├───────────────────────────────┤
//! │ main.c - 3 lines      c | 1/3 │ ← status bar (inverted)
//! │ HELP: Ctrl-S = save | ...     │ ← message bar
//! └───────────────────────────────┘
//! ```
//!
//! It does not own the document or cursor; both are passed to
//! [`render`](View::render). The frame is built in an [`OutputBuffer`] and
//! the caller flushes it with one write.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use kilo_term::ansi;
use kilo_term::color::Color;
use kilo_term::output::{ColorWriter, OutputBuffer};
use kilo_term::terminal::Size;

use crate::cursor::Cursor;
use crate::document::Document;
use crate::highlight::Highlight;

/// Version shown on the welcome line.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How long a status message stays on the message bar.
pub const MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Rows taken by the status bar and the message bar.
const BAR_ROWS: usize = 2;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Columns needed for right-aligned line numbers plus a separator space.
///
/// | Rows    | Gutter |
/// |---------|--------|
/// | 0–9     | 2      |
/// | 10–99   | 3      |
/// | 100–999 | 4      |
///
/// Returns 0 when `show_numbers` is false.
#[must_use]
pub fn gutter_width(row_count: usize, show_numbers: bool) -> usize {
    if !show_numbers {
        return 0;
    }
    // At least 1, so ilog10 doesn't panic on 0.
    let digits = row_count.max(1).ilog10() as usize + 1;
    digits + 1
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Top-left corner of the visible window, in rows and rendered columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub row_offset: usize,
    pub col_offset: usize,
}

impl Viewport {
    /// Move the window the least distance that puts `(cy, rx)` inside a
    /// `rows` × `cols` area. Calling it twice changes nothing.
    pub const fn scroll(&mut self, cy: usize, rx: usize, rows: usize, cols: usize) {
        let rows = if rows == 0 { 1 } else { rows };
        let cols = if cols == 0 { 1 } else { cols };

        if cy < self.row_offset {
            self.row_offset = cy;
        }
        if cy >= self.row_offset + rows {
            self.row_offset = cy + 1 - rows;
        }
        if rx < self.col_offset {
            self.col_offset = rx;
        }
        if rx >= self.col_offset + cols {
            self.col_offset = rx + 1 - cols;
        }
    }
}

// ---------------------------------------------------------------------------
// Status message
// ---------------------------------------------------------------------------

/// Text for the message bar, stamped with when it was set.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    text: String,
    set_at: Instant,
}

impl StatusMessage {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            set_at: Instant::now(),
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text, if it is non-empty and younger than [`MESSAGE_TIMEOUT`]
    /// at `now`.
    #[must_use]
    pub fn visible_at(&self, now: Instant) -> Option<&str> {
        let fresh = now.saturating_duration_since(self.set_at) < MESSAGE_TIMEOUT;
        (fresh && !self.text.is_empty()).then_some(self.text.as_str())
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Scroll state and display settings for the single editor window.
#[derive(Debug, Clone)]
pub struct View {
    viewport: Viewport,
    size: Size,
    line_numbers: bool,
}

impl View {
    #[must_use]
    pub const fn new(size: Size, line_numbers: bool) -> Self {
        Self {
            viewport: Viewport {
                row_offset: 0,
                col_offset: 0,
            },
            size,
            line_numbers,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    pub const fn resize(&mut self, size: Size) {
        self.size = size;
    }

    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Put the window back where it was, e.g. after a cancelled search.
    pub const fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    #[inline]
    #[must_use]
    pub const fn line_numbers(&self) -> bool {
        self.line_numbers
    }

    /// Terminal rows available for text.
    #[must_use]
    pub const fn text_rows(&self) -> usize {
        (self.size.rows as usize).saturating_sub(BAR_ROWS)
    }

    /// Terminal columns available for text, after the gutter.
    #[must_use]
    pub fn text_cols(&self, doc: &Document) -> usize {
        (self.size.cols as usize).saturating_sub(self.gutter(doc))
    }

    fn gutter(&self, doc: &Document) -> usize {
        gutter_width(doc.len(), self.line_numbers)
    }

    // -- Scrolling ----------------------------------------------------------

    /// Bring the cursor into the window.
    pub fn scroll(&mut self, doc: &Document, cursor: &Cursor) {
        let rx = cursor.rx(doc);
        let rows = self.text_rows();
        let cols = self.text_cols(doc);
        self.viewport.scroll(cursor.line(), rx, rows, cols);
    }

    // -- Rendering ----------------------------------------------------------

    /// Scroll, then append one full frame to `out`.
    ///
    /// `message` is the message-bar text; pass `None` once it has expired.
    ///
    /// # Errors
    ///
    /// Returns the error from `out`.
    pub fn render(
        &mut self,
        out: &mut OutputBuffer,
        doc: &Document,
        cursor: &Cursor,
        message: Option<&str>,
    ) -> io::Result<()> {
        self.scroll(doc, cursor);
        self.draw(out, doc, cursor, message)
    }

    fn draw(
        &self,
        out: &mut OutputBuffer,
        doc: &Document,
        cursor: &Cursor,
        message: Option<&str>,
    ) -> io::Result<()> {
        ansi::cursor_hide(out)?;
        ansi::cursor_home(out)?;

        self.draw_rows(out, doc)?;
        self.draw_status_bar(out, doc, cursor)?;
        self.draw_message_bar(out, message)?;

        let x = cursor.rx(doc) - self.viewport.col_offset + self.gutter(doc);
        let y = cursor.line() - self.viewport.row_offset;
        ansi::cursor_to(out, x, y)?;
        ansi::cursor_show(out)
    }

    fn draw_rows(&self, out: &mut OutputBuffer, doc: &Document) -> io::Result<()> {
        let rows = self.text_rows();
        let cols = self.text_cols(doc);
        let gutter = self.gutter(doc);

        for y in 0..rows {
            let file_row = y + self.viewport.row_offset;
            match doc.row(file_row) {
                Some(row) => {
                    if gutter > 0 {
                        write!(out, "{:>width$} ", file_row + 1, width = gutter - 1)?;
                    }
                    let start = self.viewport.col_offset.min(row.rendered().len());
                    let end = (start + cols).min(row.rendered().len());
                    draw_text(out, &row.rendered()[start..end], &row.highlight()[start..end])?;
                }
                None if doc.is_empty() && y == rows / 3 => {
                    draw_welcome(out, self.size.cols as usize)?;
                }
                None => out.push(b'~'),
            }
            ansi::clear_line(out)?;
            out.write_all(b"\r\n")?;
        }
        Ok(())
    }

    fn draw_status_bar(
        &self,
        out: &mut OutputBuffer,
        doc: &Document,
        cursor: &Cursor,
    ) -> io::Result<()> {
        let cols = self.size.cols as usize;
        let name = doc
            .path()
            .map_or_else(|| "[No Name]".to_owned(), |p| p.display().to_string());
        let name: String = name.chars().take(20).collect();
        let modified = if doc.is_dirty() { "(modified)" } else { "" };

        let left = format!("{name} - {} lines {modified}", doc.len());
        let right = format!(
            "{} | {}/{}",
            doc.filetype().unwrap_or("no ft"),
            cursor.line() + 1,
            doc.len()
        );

        ansi::inverse(out)?;
        let left = truncate(left.as_bytes(), cols);
        out.write_all(left)?;
        let mut len = left.len();
        while len < cols {
            if cols - len == right.len() {
                out.write_all(right.as_bytes())?;
                break;
            }
            out.push(b' ');
            len += 1;
        }
        ansi::reset(out)?;
        out.write_all(b"\r\n")
    }

    fn draw_message_bar(&self, out: &mut OutputBuffer, message: Option<&str>) -> io::Result<()> {
        ansi::clear_line(out)?;
        if let Some(text) = message {
            out.write_all(truncate(text.as_bytes(), self.size.cols as usize))?;
        }
        Ok(())
    }
}

/// Rendered bytes with per-tag colour. Control bytes show inverted as
/// `@`+byte, or `?` past Ctrl-Z.
fn draw_text(
    out: &mut OutputBuffer,
    text: &[u8],
    tags: &[Highlight],
) -> io::Result<()> {
    let mut colors = ColorWriter::new();
    for (&byte, tag) in text.iter().zip(tags) {
        if byte.is_ascii_control() {
            let symbol = if byte <= 26 { b'@' + byte } else { b'?' };
            ansi::inverse(out)?;
            out.push(symbol);
            ansi::reset(out)?;
            // SGR 0 dropped the colour too.
            colors = ColorWriter::new();
        } else {
            colors.set(out, tag.color())?;
            out.push(byte);
        }
    }
    colors.set(out, Color::Default)
}

fn draw_welcome(out: &mut OutputBuffer, cols: usize) -> io::Result<()> {
    let welcome = format!("Kilo editor -- version {VERSION}");
    let welcome = truncate(welcome.as_bytes(), cols);
    let mut padding = (cols - welcome.len()) / 2;
    if padding > 0 {
        out.push(b'~');
        padding -= 1;
    }
    out.fill(b' ', padding);
    out.write_all(welcome)
}

fn truncate(bytes: &[u8], max: usize) -> &[u8] {
    &bytes[..bytes.len().min(max)]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
